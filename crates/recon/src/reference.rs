use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::model::{PersonId, PersonIdError, PersonRecord, WIKIDATA_ID_COLUMN};

/// The authoritative table as loaded, before indexing.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    pub columns: Vec<String>,
    pub records: Vec<PersonRecord>,
}

/// Read-only lookups over the reference table.
#[derive(Debug)]
pub struct ReferenceIndex {
    records: Vec<PersonRecord>,
    by_key: HashMap<(String, String), usize>,
    person_ids: HashSet<String>,
    wikidata_owner: HashMap<String, String>,
    max_person_id: Option<PersonId>,
}

impl ReferenceIndex {
    /// Index a reference table. Fails before any row is processed if the
    /// table cannot tell identities apart by `wikidata_id`.
    pub fn build(table: &ReferenceTable) -> Result<Self, ReconError> {
        if !table.columns.iter().any(|c| c == WIKIDATA_ID_COLUMN) {
            return Err(ReconError::MissingColumn(WIKIDATA_ID_COLUMN.into()));
        }
        Self::from_records(table.records.clone())
    }

    /// Index records without the column check. Malformed ids count as known
    /// but never seed minting; an id too wide to count from is an error.
    pub fn from_records(records: Vec<PersonRecord>) -> Result<Self, ReconError> {
        let mut by_key = HashMap::new();
        let mut person_ids = HashSet::new();
        let mut wikidata_owner = HashMap::new();
        let mut max_person_id: Option<PersonId> = None;

        for (i, rec) in records.iter().enumerate() {
            let Some(pid) = rec.person_id.as_deref() else {
                continue;
            };
            person_ids.insert(pid.to_string());
            // First row wins on duplicate keys
            by_key
                .entry((pid.to_string(), rec.name_lang.clone()))
                .or_insert(i);
            if let Some(qid) = rec.wikidata_id.as_deref() {
                wikidata_owner
                    .entry(qid.to_string())
                    .or_insert_with(|| pid.to_string());
            }
            match PersonId::parse(pid) {
                Ok(parsed) => {
                    if max_person_id.as_ref().map_or(true, |m| parsed > *m) {
                        max_person_id = Some(parsed);
                    }
                }
                Err(PersonIdError::Malformed) => {}
                Err(PersonIdError::Overflow) => {
                    return Err(ReconError::IdentifierOverflow {
                        person_id: pid.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            records,
            by_key,
            person_ids,
            wikidata_owner,
            max_person_id,
        })
    }

    pub fn contains_person(&self, person_id: &str) -> bool {
        self.person_ids.contains(person_id)
    }

    /// The reference row for a `(person_id, name_lang)` pair.
    pub fn lookup(&self, person_id: &str, name_lang: &str) -> Option<&PersonRecord> {
        self.by_key
            .get(&(person_id.to_string(), name_lang.to_string()))
            .map(|&i| &self.records[i])
    }

    /// The `person_id` that already carries this `wikidata_id`, if any.
    pub fn owner_of(&self, wikidata_id: &str) -> Option<&str> {
        self.wikidata_owner.get(wikidata_id).map(String::as_str)
    }

    pub fn max_person_id(&self) -> Option<&PersonId> {
        self.max_person_id.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pid: &str, lang: &str, qid: &str) -> PersonRecord {
        let mut r = PersonRecord::default();
        r.set_column("person_id", pid);
        r.set_column("wikidata_id", qid);
        r.name_lang = lang.into();
        r
    }

    #[test]
    fn missing_wikidata_column_fails_fast() {
        let table = ReferenceTable {
            columns: vec!["person_id".into(), "name_lang".into()],
            records: vec![rec("AG0001", "en", "")],
        };
        let err = ReferenceIndex::build(&table).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn(ref c) if c == "wikidata_id"));
    }

    #[test]
    fn compound_key_lookup() {
        let idx = ReferenceIndex::from_records(vec![
            rec("AG0001", "en", "Q1"),
            rec("AG0001", "zh", "Q1"),
        ])
        .unwrap();
        assert!(idx.lookup("AG0001", "zh").is_some());
        assert!(idx.lookup("AG0001", "fr").is_none());
        assert!(idx.contains_person("AG0001"));
        assert!(!idx.contains_person("AG0002"));
    }

    #[test]
    fn max_person_id_is_numeric() {
        // Lexicographically "AG999" > "AG1000"; numerically it is not.
        let idx = ReferenceIndex::from_records(vec![
            rec("AG999", "en", ""),
            rec("AG1000", "en", ""),
            rec("bogus", "en", ""),
        ])
        .unwrap();
        assert_eq!(idx.max_person_id().unwrap().to_string(), "AG1000");
        assert!(idx.contains_person("bogus"));
    }

    #[test]
    fn wikidata_owner() {
        let idx = ReferenceIndex::from_records(vec![rec("AG0001", "en", "Q1"), rec("AG0002", "en", "")]).unwrap();
        assert_eq!(idx.owner_of("Q1"), Some("AG0001"));
        assert_eq!(idx.owner_of("Q2"), None);
    }

    #[test]
    fn empty_reference_has_no_seed() {
        let idx = ReferenceIndex::from_records(Vec::new()).unwrap();
        assert!(idx.is_empty());
        assert!(idx.max_person_id().is_none());
    }

    #[test]
    fn max_person_id_beyond_u32() {
        let idx = ReferenceIndex::from_records(vec![
            rec("AG0005", "en", ""),
            rec("AG99999999999", "en", ""),
        ])
        .unwrap();
        assert_eq!(idx.max_person_id().unwrap().to_string(), "AG99999999999");
    }

    #[test]
    fn suffix_too_wide_to_count_from_fails_the_build() {
        let table = ReferenceTable {
            columns: vec!["person_id".into(), "wikidata_id".into(), "name_lang".into()],
            records: vec![
                rec("AG0005", "en", ""),
                rec("AG123456789012345678901234", "en", ""),
            ],
        };
        let err = ReferenceIndex::build(&table).unwrap_err();
        assert!(
            matches!(err, ReconError::IdentifierOverflow { ref person_id } if person_id == "AG123456789012345678901234"),
            "{err}"
        );
    }
}
