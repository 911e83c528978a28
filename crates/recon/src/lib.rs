//! `readactor-recon`: person table reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded candidate table, a reference
//! table and an identity lookup, and mutates candidate rows in place.
//! No CLI or IO dependencies.

pub mod classify;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod model;
pub mod names;
pub mod note;
pub mod reference;
pub mod summary;

pub use classify::{classify, RowPath};
pub use engine::{ReconOptions, Reconciler, RowOutcome, RowStatus, RunReport};
pub use error::{ConflictKind, FatalConflict, ReconError};
pub use lookup::{ExternalIdentitySnapshot, IdentityLookup, LookupError, NameCandidate};
pub use model::{Field, PersonId, PersonIdError, PersonRecord};
pub use names::{order_name_by_language, NameTuple};
pub use reference::{ReferenceIndex, ReferenceTable};
pub use summary::RunSummary;
