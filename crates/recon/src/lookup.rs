//! Contract for the external identity service (Wikidata in production).

use serde::Serialize;
use thiserror::Error;

use crate::model::{Field, PersonRecord};
use crate::names::NameTuple;

/// What the knowledge base knows about one external identifier.
///
/// Absent fields are never treated as disagreeing with the candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalIdentitySnapshot {
    pub gender: Option<String>,
    pub birth_year: Option<String>,
    pub death_year: Option<String>,
    pub birth_place: Option<String>,
}

impl ExternalIdentitySnapshot {
    /// Snapshot values paired with the candidate field they map onto.
    pub fn fields(&self) -> [(Field, Option<&str>); 4] {
        [
            (Field::Sex, self.gender.as_deref()),
            (Field::BirthYear, self.birth_year.as_deref()),
            (Field::DeathYear, self.death_year.as_deref()),
            (Field::PlaceOfBirth, self.birth_place.as_deref()),
        ]
    }

    /// Overwrite the record's fields where the snapshot disagrees.
    /// Returns the fields that changed, in snapshot order.
    pub fn apply_to(&self, record: &mut PersonRecord) -> Vec<Field> {
        let mut changed = Vec::new();
        for (field, value) in self.fields() {
            if let Some(value) = value {
                if record.get(field) != value {
                    record.set(field, value);
                    changed.push(field);
                }
            }
        }
        changed
    }
}

/// One ranked answer to a name search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCandidate {
    pub external_id: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("cannot parse response: {0}")]
    Parse(String),
}

/// Name / identifier resolution oracle.
///
/// Calls are blocking; the reconciler issues one at a time.
pub trait IdentityLookup {
    fn resolve_by_external_id(&self, id: &str) -> Result<ExternalIdentitySnapshot, LookupError>;

    /// Candidates in the service's own ranking, at most `max_results`.
    fn resolve_by_name(
        &self,
        names: &NameTuple,
        name_lang: &str,
        max_results: usize,
    ) -> Result<Vec<NameCandidate>, LookupError>;
}

impl<T: IdentityLookup + ?Sized> IdentityLookup for &T {
    fn resolve_by_external_id(&self, id: &str) -> Result<ExternalIdentitySnapshot, LookupError> {
        (**self).resolve_by_external_id(id)
    }

    fn resolve_by_name(
        &self,
        names: &NameTuple,
        name_lang: &str,
        max_results: usize,
    ) -> Result<Vec<NameCandidate>, LookupError> {
        (**self).resolve_by_name(names, name_lang, max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_touches_present_and_different() {
        let mut r = PersonRecord {
            sex: "male".into(),
            birthyear: "1881".into(),
            deathyear: String::new(),
            ..Default::default()
        };
        let snap = ExternalIdentitySnapshot {
            gender: Some("male".into()),
            birth_year: None,
            death_year: Some("1936".into()),
            birth_place: Some("Shaoxing".into()),
        };
        let changed = snap.apply_to(&mut r);
        assert_eq!(changed, vec![Field::DeathYear, Field::PlaceOfBirth]);
        assert_eq!(r.birthyear, "1881");
        assert_eq!(r.deathyear, "1936");
        assert_eq!(r.place_of_birth, "Shaoxing");
    }

    #[test]
    fn empty_snapshot_changes_nothing() {
        let mut r = PersonRecord {
            sex: "female".into(),
            ..Default::default()
        };
        assert!(ExternalIdentitySnapshot::default().apply_to(&mut r).is_empty());
        assert_eq!(r.sex, "female");
    }
}
