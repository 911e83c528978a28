use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{RowOutcome, RowStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub skipped: usize,
    pub unchanged: usize,
    pub checked: usize,
    pub merged: usize,
    pub no_match: usize,
    pub minted: usize,
    pub path_counts: BTreeMap<String, usize>,
}

impl RunSummary {
    /// Rows whose content the run changed.
    pub fn modified(&self) -> usize {
        self.checked + self.merged + self.no_match
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows: {} merged, {} checked, {} unchanged, {} no match, {} skipped ({} person_id minted)",
            self.total, self.merged, self.checked, self.unchanged, self.no_match, self.skipped, self.minted,
        )
    }
}

/// Compute summary statistics from row outcomes.
pub fn compute_summary(outcomes: &[RowOutcome]) -> RunSummary {
    let mut summary = RunSummary {
        total: outcomes.len(),
        ..Default::default()
    };

    for o in outcomes {
        *summary.path_counts.entry(o.path.to_string()).or_insert(0) += 1;

        match o.status {
            RowStatus::Skipped => summary.skipped += 1,
            RowStatus::Unchanged => summary.unchanged += 1,
            RowStatus::Checked => summary.checked += 1,
            RowStatus::Merged => summary.merged += 1,
            RowStatus::NoMatch => summary.no_match += 1,
        }
        if o.minted.is_some() {
            summary.minted += 1;
        }
    }

    summary
}
