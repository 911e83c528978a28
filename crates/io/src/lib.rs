// File I/O: person tables on disk, reference tables on disk or over HTTP

pub mod csv;
pub mod error;
pub mod reference;
pub mod write;

pub use crate::csv::{parse_table, read_candidates, read_file_as_utf8, resolve_input_path, PersonTable};
pub use error::IoError;
pub use reference::{load_reference, ReferenceSource};
pub use write::{updated_path, write_table, WriteMode, WriteReport};

/// File name looked up when the input path is a directory.
pub const DEFAULT_TABLE_NAME: &str = "Person.csv";
