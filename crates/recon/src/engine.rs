use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::classify::{classify, RowPath};
use crate::cursor::{IdCursor, MintError};
use crate::error::{ConflictKind, FatalConflict, ReconError};
use crate::lookup::{IdentityLookup, LookupError};
use crate::model::{Field, PersonRecord, PERSON_ID_COLUMN, WIKIDATA_ID_COLUMN};
use crate::names::order_name_by_language;
use crate::note;
use crate::reference::ReferenceIndex;
use crate::summary::{compute_summary, RunSummary};

pub const DEFAULT_BOT_NAME: &str = "SemBot";
pub const DEFAULT_MAX_NAME_RESULTS: usize = 2;
pub const DEFAULT_ID_WARN_THRESHOLD: u32 = 9999;

// ---------------------------------------------------------------------------
// Options + results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReconOptions {
    /// Name used to attribute annotations and provenance stamps.
    pub bot_name: String,
    /// Date written into `last_modified`, `YYYY-MM-DD`.
    pub today: String,
    pub max_name_results: usize,
    pub id_warn_threshold: u32,
}

impl Default for ReconOptions {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.into(),
            today: chrono::Local::now().format("%Y-%m-%d").to_string(),
            max_name_results: DEFAULT_MAX_NAME_RESULTS,
            id_warn_threshold: DEFAULT_ID_WARN_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Note said "skip".
    Skipped,
    /// Matched the reference exactly; row untouched.
    Unchanged,
    /// Verified against Wikidata; annotated and stamped, no values changed.
    Checked,
    /// One or more values were overwritten or assigned.
    Merged,
    /// The name search found nobody.
    NoMatch,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Checked => write!(f, "checked"),
            Self::Merged => write!(f, "merged"),
            Self::NoMatch => write!(f, "no_match"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    /// 1-based line number in the CSV (the header is line 1).
    pub row: usize,
    pub path: RowPath,
    pub status: RowStatus,
    /// Column names whose values changed, in annotation order.
    pub changed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<RowOutcome>,
    pub summary: RunSummary,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Row-by-row reconciliation of a candidate table.
///
/// Holds the only mutable run state: the identifier cursor.
pub struct Reconciler<'r, L> {
    reference: &'r ReferenceIndex,
    lookup: L,
    cursor: IdCursor,
    options: ReconOptions,
}

impl<'r, L: IdentityLookup> Reconciler<'r, L> {
    pub fn new(reference: &'r ReferenceIndex, lookup: L, options: ReconOptions) -> Self {
        let cursor = IdCursor::new(reference.max_person_id().cloned());
        Self {
            reference,
            lookup,
            cursor,
            options,
        }
    }

    /// Reconcile every row in order. Stops at the first error; rows before it
    /// stay mutated, rows after it are untouched.
    pub fn run(&mut self, records: &mut [PersonRecord]) -> Result<RunReport, ReconError> {
        let mut outcomes = Vec::with_capacity(records.len());
        for (index, record) in records.iter_mut().enumerate() {
            outcomes.push(self.reconcile_row(index, record)?);
        }
        let summary = compute_summary(&outcomes);
        Ok(RunReport { outcomes, summary })
    }

    /// Reconcile one row. `index` is the 0-based data row index.
    pub fn reconcile_row(
        &mut self,
        index: usize,
        record: &mut PersonRecord,
    ) -> Result<RowOutcome, ReconError> {
        let row = index + 2;
        let path = classify(record, self.reference);

        info!("-------------");
        info!("For row {row}: [{}]", record.values().join(", "));
        debug!(row, %path, "classified");

        let mut outcome = RowOutcome {
            row,
            path,
            status: RowStatus::Skipped,
            changed: Vec::new(),
            minted: None,
        };

        match path {
            RowPath::Skip => {
                info!("Row {row} is marked skip");
            }
            RowPath::MatchedById => self.reconcile_matched(record, &mut outcome)?,
            RowPath::OrphanWithExternalId => self.reconcile_external(record, &mut outcome)?,
            RowPath::NameLookupFixedId => self.reconcile_by_name(record, &mut outcome)?,
            RowPath::Minting { with_external_id } => {
                self.mint(record, &mut outcome)?;
                if with_external_id {
                    self.reconcile_external(record, &mut outcome)?;
                } else {
                    self.reconcile_by_name(record, &mut outcome)?;
                }
            }
        }

        Ok(outcome)
    }

    /// `person_id` is known: the reference row is authoritative.
    fn reconcile_matched(
        &self,
        record: &mut PersonRecord,
        outcome: &mut RowOutcome,
    ) -> Result<(), ReconError> {
        let bot = &self.options.bot_name;
        let row = outcome.row;
        let person_id = record.person_id.clone().unwrap_or_default();

        let Some(reference) = self.reference.lookup(&person_id, &record.name_lang) else {
            let message = note::missing_reference_key(&person_id, &record.name_lang, bot);
            return Err(conflict(row, record, ConflictKind::MissingReferenceKey, message));
        };

        if reference.wikidata_id != record.wikidata_id {
            let message = note::wikidata_mismatch(&person_id, reference.wikidata_id.as_deref(), bot);
            return Err(conflict(row, record, ConflictKind::WikidataMismatch, message));
        }

        let differing: Vec<Field> = Field::COMPARED
            .iter()
            .copied()
            .filter(|&f| record.get(f) != reference.get(f))
            .collect();

        if differing.is_empty() {
            info!("Row {row} is checked. Pass");
            outcome.status = RowStatus::Unchanged;
            return Ok(());
        }

        for &field in &differing {
            record.set(field, reference.get(field));
        }
        outcome.changed = differing.iter().map(|f| f.column().to_string()).collect();
        let message = note::overwritten_from_reference(&outcome.changed, bot);
        record.annotate(&message);
        info!("Row {row}: {message}");
        outcome.status = RowStatus::Merged;
        Ok(())
    }

    /// `wikidata_id` is given and `person_id` is new (or just minted).
    fn reconcile_external(
        &self,
        record: &mut PersonRecord,
        outcome: &mut RowOutcome,
    ) -> Result<(), ReconError> {
        let row = outcome.row;
        let wikidata_id = record.wikidata_id.clone().unwrap_or_default();

        if let Some(owner) = self.foreign_owner(&wikidata_id, record) {
            let message = note::wikidata_collision(&wikidata_id, owner, &self.options.bot_name);
            return Err(conflict(row, record, ConflictKind::WikidataCollision, message));
        }

        self.merge_from_lookup(record, &wikidata_id, outcome)?;
        info!("Row {row}: {}", note::updated(&outcome.changed, &self.options.bot_name));
        Ok(())
    }

    /// No `wikidata_id`: find one by name, then merge like the external path.
    fn reconcile_by_name(
        &self,
        record: &mut PersonRecord,
        outcome: &mut RowOutcome,
    ) -> Result<(), ReconError> {
        let bot = &self.options.bot_name;
        let row = outcome.row;
        let names = order_name_by_language(&record.family_name, &record.first_name, &record.name_lang);

        let candidates = if names.is_empty() {
            Vec::new()
        } else {
            match self
                .lookup
                .resolve_by_name(&names, &record.name_lang, self.options.max_name_results)
            {
                Ok(c) => c,
                Err(LookupError::NotFound(_)) => Vec::new(),
                Err(source) => return Err(ReconError::Lookup { row, source }),
            }
        };

        let Some(best) = candidates.into_iter().next() else {
            let message = note::no_match(&outcome.changed, bot);
            record.annotate(&message);
            // A freshly minted id is still a modification worth stamping.
            if outcome.minted.is_some() {
                self.stamp(record);
            }
            info!("Row {row}: {message}");
            outcome.status = RowStatus::NoMatch;
            return Ok(());
        };
        debug!(row, wikidata_id = %best.external_id, confidence = best.confidence, "name search hit");

        if let Some(owner) = self.foreign_owner(&best.external_id, record) {
            let message = note::name_lookup_collision(&best.external_id, owner, bot);
            return Err(conflict(row, record, ConflictKind::NameLookupCollision, message));
        }

        record.wikidata_id = Some(best.external_id.clone());
        outcome.changed.push(WIKIDATA_ID_COLUMN.into());
        self.merge_from_lookup(record, &best.external_id, outcome)?;

        if outcome.minted.is_some() {
            warn!(
                "For row {row}, you should look the person up in Wikidata and put the \
                 `wikidata_id` into your table yourself in the future."
            );
        } else {
            warn!(
                "You should look row {row} up in Wikidata again. If it does not match this \
                 modification, restore the old data for this row and put 'skip' in 'note'."
            );
        }
        Ok(())
    }

    /// Assign the next `person_id` from the run cursor.
    fn mint(&mut self, record: &mut PersonRecord, outcome: &mut RowOutcome) -> Result<(), ReconError> {
        let row = outcome.row;
        if self.cursor.near_exhaustion(self.options.id_warn_threshold) {
            let message = note::id_space_warning(&self.options.bot_name);
            record.annotate(&message);
            warn!("Row {row}: {message}");
        }

        let id = self
            .cursor
            .next()
            .map_err(|e| match e {
                MintError::Unseeded => ReconError::NoIdentifierSeed { row },
                MintError::Exhausted => ReconError::IdentifierExhausted { row },
            })?
            .to_string();
        debug!(row, person_id = %id, "minted");
        record.person_id = Some(id.clone());
        outcome.minted = Some(id);
        outcome.changed.push(PERSON_ID_COLUMN.into());
        Ok(())
    }

    /// Pull the snapshot for `wikidata_id`, overwrite disagreeing fields,
    /// annotate and stamp. Stamps even when nothing changed.
    fn merge_from_lookup(
        &self,
        record: &mut PersonRecord,
        wikidata_id: &str,
        outcome: &mut RowOutcome,
    ) -> Result<(), ReconError> {
        let bot = &self.options.bot_name;
        let row = outcome.row;

        match self.lookup.resolve_by_external_id(wikidata_id) {
            Ok(snapshot) => {
                let changed = snapshot.apply_to(record);
                outcome
                    .changed
                    .extend(changed.iter().map(|f| f.column().to_string()));
            }
            Err(LookupError::NotFound(_)) => {
                let message = note::not_found(wikidata_id, bot);
                record.annotate(&message);
                warn!("Row {row}: {message}");
            }
            Err(source) => return Err(ReconError::Lookup { row, source }),
        }

        record.annotate(&note::updated(&outcome.changed, bot));
        self.stamp(record);
        outcome.status = if outcome.changed.is_empty() {
            RowStatus::Checked
        } else {
            RowStatus::Merged
        };
        Ok(())
    }

    /// The other `person_id` already holding `wikidata_id`, if any.
    fn foreign_owner<'a>(&'a self, wikidata_id: &str, record: &PersonRecord) -> Option<&'a str> {
        self.reference
            .owner_of(wikidata_id)
            .filter(|owner| Some(*owner) != record.person_id.as_deref())
    }

    fn stamp(&self, record: &mut PersonRecord) {
        record.last_modified = self.options.today.clone();
        record.last_modified_by = self.options.bot_name.clone();
    }
}

/// Annotate the row, log it, and build the run-stopping error.
fn conflict(row: usize, record: &mut PersonRecord, kind: ConflictKind, message: String) -> ReconError {
    record.annotate(&message);
    error!(%kind, "For row {row}: {message}");
    FatalConflict { row, kind, message }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{ExternalIdentitySnapshot, NameCandidate};
    use crate::names::NameTuple;
    use std::cell::Cell;

    /// Lookup that must never be reached.
    struct Unreachable;

    impl IdentityLookup for Unreachable {
        fn resolve_by_external_id(&self, id: &str) -> Result<ExternalIdentitySnapshot, LookupError> {
            panic!("unexpected lookup for {id}")
        }

        fn resolve_by_name(
            &self,
            names: &NameTuple,
            _: &str,
            _: usize,
        ) -> Result<Vec<NameCandidate>, LookupError> {
            panic!("unexpected name search for {}", names.label())
        }
    }

    /// Lookup that fails at the transport level and counts calls.
    struct Offline(Cell<usize>);

    impl IdentityLookup for Offline {
        fn resolve_by_external_id(&self, _: &str) -> Result<ExternalIdentitySnapshot, LookupError> {
            self.0.set(self.0.get() + 1);
            Err(LookupError::Transport("connection refused".into()))
        }

        fn resolve_by_name(
            &self,
            _: &NameTuple,
            _: &str,
            _: usize,
        ) -> Result<Vec<NameCandidate>, LookupError> {
            self.0.set(self.0.get() + 1);
            Err(LookupError::Transport("connection refused".into()))
        }
    }

    fn person(pid: &str, qid: &str, lang: &str) -> PersonRecord {
        let mut r = PersonRecord::default();
        r.set_column("person_id", pid);
        r.set_column("wikidata_id", qid);
        r.name_lang = lang.into();
        r.family_name = "Lu".into();
        r.first_name = "Xun".into();
        r
    }

    fn options() -> ReconOptions {
        ReconOptions {
            today: "2026-10-16".into(),
            ..Default::default()
        }
    }

    #[test]
    fn skip_rows_are_untouched() {
        let index = ReferenceIndex::from_records(vec![person("AG0001", "Q1", "en")]).unwrap();
        let mut rec = person("AG0001", "Q999", "en");
        rec.note = "SKIP".into();
        let before = rec.clone();

        let mut r = Reconciler::new(&index, Unreachable, options());
        let out = r.reconcile_row(0, &mut rec).unwrap();
        assert_eq!(out.status, RowStatus::Skipped);
        assert_eq!(rec, before);
    }

    #[test]
    fn known_id_without_wikidata_conflicts_with_reference() {
        let index = ReferenceIndex::from_records(vec![person("AG0001", "Q1", "en")]).unwrap();
        let mut rec = person("AG0001", "", "en");
        let mut r = Reconciler::new(&index, Unreachable, options());
        let err = r.reconcile_row(0, &mut rec).unwrap_err();
        assert_eq!(err.as_conflict().unwrap().kind, ConflictKind::WikidataMismatch);
    }

    #[test]
    fn missing_compound_key_is_fatal() {
        let index = ReferenceIndex::from_records(vec![person("AG0001", "Q1", "zh")]).unwrap();
        let mut rec = person("AG0001", "Q1", "en");
        let mut r = Reconciler::new(&index, Unreachable, options());
        let err = r.reconcile_row(3, &mut rec).unwrap_err();
        let c = err.as_conflict().unwrap();
        assert_eq!(c.kind, ConflictKind::MissingReferenceKey);
        assert_eq!(c.row, 5);
        assert!(rec.note.contains(&c.message));
    }

    #[test]
    fn transport_failure_aborts_without_annotation() {
        let index = ReferenceIndex::from_records(vec![person("AG0001", "Q1", "en")]).unwrap();
        let mut rec = person("AG0002", "Q2", "en");
        let lookup = Offline(Cell::new(0));
        let mut r = Reconciler::new(&index, &lookup, options());
        let err = r.reconcile_row(0, &mut rec).unwrap_err();
        assert!(matches!(err, ReconError::Lookup { row: 2, .. }));
        assert_eq!(lookup.0.get(), 1);
        assert!(rec.note.is_empty());
    }

    #[test]
    fn minting_without_seed_is_an_error() {
        let index = ReferenceIndex::from_records(Vec::new()).unwrap();
        let mut rec = person("", "Q5", "en");
        let mut r = Reconciler::new(&index, Unreachable, options());
        let err = r.reconcile_row(0, &mut rec).unwrap_err();
        assert!(matches!(err, ReconError::NoIdentifierSeed { row: 2 }));
    }

    #[test]
    fn nameless_row_skips_the_search() {
        let index = ReferenceIndex::from_records(vec![person("AG0001", "Q1", "en")]).unwrap();
        let mut rec = person("AG0500", "", "en");
        rec.family_name.clear();
        rec.first_name.clear();
        let mut r = Reconciler::new(&index, Unreachable, options());
        let out = r.reconcile_row(0, &mut rec).unwrap();
        assert_eq!(out.status, RowStatus::NoMatch);
        assert_eq!(rec.note, "No match in Wikidata. By SemBot.");
        assert!(rec.last_modified.is_empty());
    }
}
