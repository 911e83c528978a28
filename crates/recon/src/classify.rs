use serde::Serialize;

use crate::model::PersonRecord;
use crate::reference::ReferenceIndex;

/// Where a row's `person_id` stands relative to the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonIdState {
    Known,
    Unknown,
    Absent,
}

/// Reconciliation path for one candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowPath {
    /// Note says "skip"; the row is not touched.
    Skip,
    MatchedById,
    OrphanWithExternalId,
    NameLookupFixedId,
    /// No `person_id`: mint one, then continue as one of the two orphan paths.
    Minting { with_external_id: bool },
}

impl std::fmt::Display for RowPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::MatchedById => write!(f, "matched_by_id"),
            Self::OrphanWithExternalId => write!(f, "orphan_with_external_id"),
            Self::NameLookupFixedId => write!(f, "name_lookup_fixed_id"),
            Self::Minting { with_external_id: true } => write!(f, "minting_with_external_id"),
            Self::Minting { with_external_id: false } => write!(f, "minting_by_name"),
        }
    }
}

impl Serialize for RowPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Pure routing on identifier presence.
pub fn route(person_id: PersonIdState, has_wikidata_id: bool) -> RowPath {
    match (person_id, has_wikidata_id) {
        (PersonIdState::Known, _) => RowPath::MatchedById,
        (PersonIdState::Unknown, true) => RowPath::OrphanWithExternalId,
        (PersonIdState::Unknown, false) => RowPath::NameLookupFixedId,
        (PersonIdState::Absent, with_external_id) => RowPath::Minting { with_external_id },
    }
}

/// Classify a candidate row. Never mutates anything.
pub fn classify(record: &PersonRecord, reference: &ReferenceIndex) -> RowPath {
    if record.is_skipped() {
        return RowPath::Skip;
    }
    let state = match record.person_id.as_deref() {
        None => PersonIdState::Absent,
        Some(pid) if reference.contains_person(pid) => PersonIdState::Known,
        Some(_) => PersonIdState::Unknown,
    };
    route(state, record.has_wikidata_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_table() {
        use PersonIdState::*;
        assert_eq!(route(Known, true), RowPath::MatchedById);
        assert_eq!(route(Known, false), RowPath::MatchedById);
        assert_eq!(route(Unknown, true), RowPath::OrphanWithExternalId);
        assert_eq!(route(Unknown, false), RowPath::NameLookupFixedId);
        assert_eq!(route(Absent, true), RowPath::Minting { with_external_id: true });
        assert_eq!(route(Absent, false), RowPath::Minting { with_external_id: false });
    }

    #[test]
    fn classify_against_reference() {
        let mut known = PersonRecord::default();
        known.set_column("person_id", "AG0001");
        known.set_column("wikidata_id", "Q1");
        let index = crate::reference::ReferenceIndex::from_records(vec![known.clone()]).unwrap();

        assert_eq!(classify(&known, &index), RowPath::MatchedById);

        let mut orphan = PersonRecord::default();
        orphan.set_column("person_id", "AG0500");
        assert_eq!(classify(&orphan, &index), RowPath::NameLookupFixedId);
        orphan.set_column("wikidata_id", "Q9");
        assert_eq!(classify(&orphan, &index), RowPath::OrphanWithExternalId);

        let mut skipped = known.clone();
        skipped.note = "Skip".into();
        assert_eq!(classify(&skipped, &index), RowPath::Skip);

        assert_eq!(
            classify(&PersonRecord::default(), &index),
            RowPath::Minting { with_external_id: false }
        );
    }
}
