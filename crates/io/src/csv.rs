// Person table CSV import/export

use std::io::Read;
use std::path::{Path, PathBuf};

use readactor_recon::model::PERSON_COLUMNS;
use readactor_recon::{PersonRecord, ReferenceTable};

use crate::error::IoError;
use crate::DEFAULT_TABLE_NAME;

/// A person table as read from disk: header order plus typed rows.
///
/// Columns the reconciler does not know about ride along in
/// [`PersonRecord::extra`] and are written back in their original position.
/// `source_cells` keeps each row's cells as read, untrimmed; rows marked
/// "skip" are written back from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonTable {
    pub columns: Vec<String>,
    pub records: Vec<PersonRecord>,
    pub source_cells: Vec<Vec<String>>,
}

impl PersonTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header used on export: the input header, then any known column the
    /// input lacked.
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns = self.columns.clone();
        for known in PERSON_COLUMNS {
            if !columns.iter().any(|c| c == known) {
                columns.push(known.to_string());
            }
        }
        columns
    }

    pub fn to_csv_string(&self) -> Result<String, IoError> {
        let columns = self.output_columns();
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let encode_err = |e: csv::Error| IoError::Parse {
            origin: "output".into(),
            message: e.to_string(),
        };

        writer.write_record(&columns).map_err(encode_err)?;
        for (i, record) in self.records.iter().enumerate() {
            let row: Vec<&str> = match self.source_cells.get(i) {
                Some(source) if record.is_skipped() => (0..columns.len())
                    .map(|c| source.get(c).map_or("", String::as_str))
                    .collect(),
                _ => columns.iter().map(|c| cell(record, c)).collect(),
            };
            writer.write_record(&row).map_err(encode_err)?;
        }

        let bytes = writer.into_inner().map_err(|e| IoError::Parse {
            origin: "output".into(),
            message: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| IoError::Parse {
            origin: "output".into(),
            message: e.to_string(),
        })
    }

    pub fn into_reference(self) -> ReferenceTable {
        ReferenceTable {
            columns: self.columns,
            records: self.records,
        }
    }
}

fn cell<'a>(record: &'a PersonRecord, column: &str) -> &'a str {
    record
        .column_value(column)
        .or_else(|| {
            record
                .extra
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.as_str())
        })
        .unwrap_or("")
}

/// A directory argument means the `Person.csv` inside it.
pub fn resolve_input_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_TABLE_NAME)
    } else {
        path.to_path_buf()
    }
}

pub fn read_candidates(path: &Path) -> Result<PersonTable, IoError> {
    let content = read_file_as_utf8(path)?;
    let table = parse_table(&content, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), rows = table.len(), "read person table");
    Ok(table)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse CSV text with a header row. `origin` names the source in errors.
pub fn parse_table(content: &str, origin: &str) -> Result<PersonTable, IoError> {
    let parse_err = |message: String| IoError::Parse {
        origin: origin.to_string(),
        message,
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| parse_err(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(parse_err("missing header row".into()));
    }

    let mut records = Vec::new();
    let mut source_cells = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let raw = result.map_err(|e| parse_err(e.to_string()))?;
        if raw.len() > columns.len() {
            // header is line 1
            return Err(parse_err(format!(
                "line {}: expected {} fields, found {}",
                row_idx + 2,
                columns.len(),
                raw.len()
            )));
        }

        let mut record = PersonRecord::default();
        for (col_idx, column) in columns.iter().enumerate() {
            let value = raw.get(col_idx).unwrap_or("");
            if !record.set_column(column, value) {
                record.extra.push((column.clone(), value.to_string()));
            }
        }
        records.push(record);
        source_cells.push(raw.iter().map(str::to_string).collect());
    }

    Ok(PersonTable {
        columns,
        records,
        source_cells,
    })
}
