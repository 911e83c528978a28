use crate::model::PersonId;

/// Why the cursor could not mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintError {
    /// The reference table had no well-formed `person_id` to count from.
    Unseeded,
    /// The previous id has no successor.
    Exhausted,
}

/// Run-local counter for minting `person_id`s.
///
/// Seeded once from the reference table's maximum and advanced only by
/// [`IdCursor::next`]; never re-read from the reference table.
#[derive(Debug, Clone)]
pub struct IdCursor {
    last: Option<PersonId>,
}

impl IdCursor {
    pub fn new(seed: Option<PersonId>) -> Self {
        Self { last: seed }
    }

    /// True once the numeric suffix has reached `threshold`.
    pub fn near_exhaustion(&self, threshold: u32) -> bool {
        self.last
            .as_ref()
            .is_some_and(|id| id.number >= u64::from(threshold))
    }

    /// Mint the next identifier and advance.
    pub fn next(&mut self) -> Result<PersonId, MintError> {
        let last = self.last.as_ref().ok_or(MintError::Unseeded)?;
        let next = last.successor().ok_or(MintError::Exhausted)?;
        self.last = Some(next.clone());
        Ok(next)
    }
}
