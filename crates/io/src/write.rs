use std::path::{Path, PathBuf};

use crate::csv::PersonTable;
use crate::error::IoError;

/// Where the reconciled table goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the input file.
    InPlace,
    /// Write `<stem>_updated.csv` next to the input.
    NewFile,
    /// Write nothing; the caller prints the table.
    Summary,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InPlace => write!(f, "in_place"),
            Self::NewFile => write!(f, "new_file"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteReport {
    pub mode: WriteMode,
    /// File written, `None` in summary mode.
    pub destination: Option<PathBuf>,
    pub rows: usize,
    /// Rendered table, only in summary mode.
    pub summary: Option<String>,
}

/// `dir/Person.csv` → `dir/Person_updated.csv`.
pub fn updated_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_updated.csv"))
}

pub fn write_table(table: &PersonTable, input: &Path, mode: WriteMode) -> Result<WriteReport, IoError> {
    let content = table.to_csv_string()?;

    let destination = match mode {
        WriteMode::Summary => {
            return Ok(WriteReport {
                mode,
                destination: None,
                rows: table.len(),
                summary: Some(content),
            })
        }
        WriteMode::InPlace => input.to_path_buf(),
        WriteMode::NewFile => updated_path(input),
    };

    std::fs::write(&destination, content).map_err(|source| IoError::Write {
        path: destination.clone(),
        source,
    })?;
    tracing::debug!(path = %destination.display(), %mode, rows = table.len(), "wrote person table");

    Ok(WriteReport {
        mode,
        destination: Some(destination),
        rows: table.len(),
        summary: None,
    })
}
