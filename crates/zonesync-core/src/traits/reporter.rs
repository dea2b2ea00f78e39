//! Operator facing report of a reconciliation run

use crate::collection::RecordCollection;
use crate::engine::ApplySummary;

/// Everything the operator reviews before confirming a change set
#[derive(Debug, Clone, Copy)]
pub struct ChangeReport<'a> {
    /// Records that will be deleted
    pub deletes: &'a RecordCollection,
    /// Records that will be created
    pub adds: &'a RecordCollection,
    /// Records that will be updated in place
    pub updates: &'a RecordCollection,
    /// Remote records already identical to the zone file
    pub unchanged: usize,
    /// Lower-case hex SHA-256 of the zone file
    pub checksum: &'a str,
}

impl ChangeReport<'_> {
    /// Total number of operations the report announces
    pub fn total_changes(&self) -> usize {
        self.deletes.len() + self.adds.len() + self.updates.len()
    }
}

/// Sink for operator facing output
///
/// Implementations decide how to render; the engine decides what and when.
pub trait Reporter: Send + Sync {
    /// Remote records that would have been deleted but are kept
    fn preserved(&self, records: &RecordCollection);

    /// The change set awaiting confirmation
    fn report(&self, report: &ChangeReport<'_>);

    /// The operator declined a confirmation prompt
    fn aborted(&self);

    /// All operations were applied
    fn applied(&self, summary: &ApplySummary);
}
