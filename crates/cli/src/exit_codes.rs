//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                              |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args)                               |
//! | 3    | Hard conflict: a row disagrees with the reference table  |
//! | 4    | Reference table unreachable or invalid                   |
//! | 5    | Wikidata lookup failed (network, HTTP, bad response)     |
//! | 6    | Input table cannot be read or written                    |
//! | 7    | Settings file invalid                                    |
//! | 8    | Declined at the interactive prompt                       |

use readactor_recon::ReconError;

/// Success - every row reconciled and the table written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// A row conflicts with the reference table. Nothing was written.
pub const EXIT_CONFLICT: u8 = 3;

/// Reference table cannot be fetched, parsed, or lacks required columns.
pub const EXIT_REFERENCE: u8 = 4;

/// Lookup service failure after retries.
pub const EXIT_LOOKUP: u8 = 5;

/// Candidate table read/write failure.
pub const EXIT_TABLE_IO: u8 = 6;

/// Settings file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 7;

/// User answered "no" (or could not be asked) at `--interactive`.
pub const EXIT_DECLINED: u8 = 8;

/// Map a reconciliation error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Conflict(_) => EXIT_CONFLICT,
        ReconError::Lookup { .. } => EXIT_LOOKUP,
        // The reference table cannot drive the run
        ReconError::MissingColumn(_)
        | ReconError::NoIdentifierSeed { .. }
        | ReconError::IdentifierOverflow { .. }
        | ReconError::IdentifierExhausted { .. } => EXIT_REFERENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readactor_recon::{ConflictKind, FatalConflict, LookupError};

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_CONFLICT, EXIT_REFERENCE,
            EXIT_LOOKUP, EXIT_TABLE_IO, EXIT_CONFIG, EXIT_DECLINED,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn recon_errors_map() {
        let conflict = ReconError::Conflict(FatalConflict {
            row: 2,
            kind: ConflictKind::WikidataMismatch,
            message: String::new(),
        });
        assert_eq!(recon_exit_code(&conflict), EXIT_CONFLICT);

        let lookup = ReconError::Lookup {
            row: 2,
            source: LookupError::Transport("down".into()),
        };
        assert_eq!(recon_exit_code(&lookup), EXIT_LOOKUP);
        assert_eq!(recon_exit_code(&ReconError::NoIdentifierSeed { row: 2 }), EXIT_REFERENCE);
        assert_eq!(recon_exit_code(&ReconError::IdentifierExhausted { row: 2 }), EXIT_REFERENCE);
        assert_eq!(
            recon_exit_code(&ReconError::IdentifierOverflow { person_id: "AG1".into() }),
            EXIT_REFERENCE
        );
        assert_eq!(
            recon_exit_code(&ReconError::MissingColumn("wikidata_id".into())),
            EXIT_REFERENCE
        );
    }
}
