use serde::Serialize;
use thiserror::Error;

use crate::lookup::LookupError;

/// Which identity invariant a row broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The row claims a known `person_id` but no reference row has its `name_lang`.
    MissingReferenceKey,
    /// `wikidata_id` disagrees with the reference row for the same `person_id`.
    WikidataMismatch,
    /// The row's `wikidata_id` already belongs to another `person_id`.
    WikidataCollision,
    /// A name search resolved to a `wikidata_id` owned by another `person_id`.
    NameLookupCollision,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingReferenceKey => write!(f, "missing_reference_key"),
            Self::WikidataMismatch => write!(f, "wikidata_mismatch"),
            Self::WikidataCollision => write!(f, "wikidata_collision"),
            Self::NameLookupCollision => write!(f, "name_lookup_collision"),
        }
    }
}

/// A hard conflict. The run must stop; `message` was written into the row's note.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}: {message}")]
pub struct FatalConflict {
    pub row: usize,
    pub kind: ConflictKind,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// The reference table lacks a column the reconciler depends on.
    #[error("reference table has no `{0}` column")]
    MissingColumn(String),

    /// A row needs a new `person_id` but the reference table has none to count from.
    #[error("row {row}: cannot mint a person_id, reference table has no well-formed person_id")]
    NoIdentifierSeed { row: usize },

    /// A reference `person_id` has a numeric suffix too large to count from.
    #[error("reference person_id {person_id} has a numeric suffix too large to count from")]
    IdentifierOverflow { person_id: String },

    /// The counter has no successor left for this prefix.
    #[error("row {row}: cannot mint a person_id, the numeric suffix space is exhausted")]
    IdentifierExhausted { row: usize },

    #[error(transparent)]
    Conflict(#[from] FatalConflict),

    /// The lookup service failed for a reason other than "not found".
    #[error("row {row}: identity lookup failed: {source}")]
    Lookup {
        row: usize,
        #[source]
        source: LookupError,
    },
}

impl ReconError {
    pub fn as_conflict(&self) -> Option<&FatalConflict> {
        match self {
            Self::Conflict(c) => Some(c),
            _ => None,
        }
    }
}
