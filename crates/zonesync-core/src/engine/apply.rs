//! Sequential execution of a change plan
//!
//! Deletes go first so that a record moving between types (for example a
//! CNAME replaced by an A record) never collides with its old self. Then
//! adds, then updates. Every operation is awaited before the next one is
//! issued. The first failure stops the run and nothing is rolled back.

use tracing::{debug, info};

use crate::error::{Error, Operation, Result};
use crate::reconcile::ChangePlan;
use crate::record::Record;
use crate::traits::DnsProvider;

/// Count of operations performed by a completed apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
}

impl ApplySummary {
    pub fn total(&self) -> usize {
        self.deleted + self.created + self.updated
    }
}

/// Pushes a change plan through a provider, one call at a time
pub struct Applier<'a> {
    provider: &'a dyn DnsProvider,
    zone_id: &'a str,
}

impl<'a> Applier<'a> {
    pub fn new(provider: &'a dyn DnsProvider, zone_id: &'a str) -> Self {
        Self { provider, zone_id }
    }

    /// Apply deletes, then adds, then updates.
    ///
    /// # Errors
    ///
    /// `Error::Apply` for the first failing operation, carrying the number of
    /// operations that had already succeeded.
    pub async fn apply(&self, plan: &ChangePlan) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();

        for record in &plan.deletes {
            let id = remote_id(record, Operation::Delete, summary.total())?;
            self.provider
                .delete_record(self.zone_id, id)
                .await
                .map_err(|e| Error::apply(Operation::Delete, record.to_string(), summary.total(), e))?;
            debug!(record = %record, "deleted");
            summary.deleted += 1;
        }

        for record in &plan.adds {
            let id = self
                .provider
                .create_record(self.zone_id, record)
                .await
                .map_err(|e| Error::apply(Operation::Create, record.to_string(), summary.total(), e))?;
            debug!(record = %record, id = %id, "created");
            summary.created += 1;
        }

        for record in &plan.updates {
            let id = remote_id(record, Operation::Update, summary.total())?;
            self.provider
                .update_record(self.zone_id, id, record)
                .await
                .map_err(|e| Error::apply(Operation::Update, record.to_string(), summary.total(), e))?;
            debug!(record = %record, "updated");
            summary.updated += 1;
        }

        info!(
            deleted = summary.deleted,
            created = summary.created,
            updated = summary.updated,
            provider = self.provider.provider_name(),
            "change plan applied"
        );

        Ok(summary)
    }
}

fn remote_id(record: &Record, operation: Operation, applied: usize) -> Result<&str> {
    record.id.as_deref().ok_or_else(|| {
        Error::apply(
            operation,
            record.to_string(),
            applied,
            Error::invalid_input("record carries no remote id"),
        )
    })
}
