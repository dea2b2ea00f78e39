//! Zone synchronisation engine
//!
//! The SyncEngine is responsible for:
//! - Fetching the live records of a zone via DnsProvider
//! - Guarding against downgrades through the version sentinel
//! - Computing the change plan
//! - Reporting and confirming it with the operator
//! - Applying it via DnsProvider
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ DesiredZone │──── records ────┐
//! └─────────────┘                 │
//!                                 ▼
//!                        ┌──────────────┐
//!                        │  SyncEngine  │
//!                        └──────────────┘
//!                                 │
//!       ┌──────────────┬──────────┼───────────┬──────────────┐
//!       ▼              ▼          ▼           ▼              ▼
//! ┌───────────┐ ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐
//! │DnsProvider│ │VersionGuard│ │Reconciler│ │ Reporter │ │ Applier │
//! │  (fetch)  │ │ (sentinel) │ │  (diff)  │ │ Confirm  │ │ (apply) │
//! └───────────┘ └────────────┘ └──────────┘ └──────────┘ └─────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Resolve the zone and list its records
//! 2. Pull out the version sentinel, then drop excluded types
//! 3. Ask before overwriting a zone written by a newer revision
//! 4. Diff desired against actual
//! 5. Report, then ask for confirmation (unless skipped); a dry run stops here
//! 6. Re-inject the sentinel and apply

mod apply;

pub use apply::{Applier, ApplySummary};

use tracing::{debug, info};

use crate::collection::RecordCollection;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::reconcile::{Reconciler, VersionGuard};
use crate::traits::{ChangeReport, Confirmation, DnsProvider, Reporter};
use crate::zonefile::DesiredZone;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The plan was applied in full
    Applied(ApplySummary),
    /// The operator declined a prompt; nothing was applied
    Aborted,
    /// Dry run: the plan was reported but not applied
    DryRun { changes: usize },
}

/// Core synchronisation engine
///
/// One engine reconciles one zone per [`SyncEngine::run()`] call. Provider
/// calls are made strictly one after another.
pub struct SyncEngine {
    /// DNS provider holding the live zone
    provider: Box<dyn DnsProvider>,

    /// Operator yes/no gate
    confirmation: Box<dyn Confirmation>,

    /// Operator facing output
    reporter: Box<dyn Reporter>,

    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when `config` does not validate.
    pub fn new(
        provider: Box<dyn DnsProvider>,
        confirmation: Box<dyn Confirmation>,
        reporter: Box<dyn Reporter>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            confirmation,
            reporter,
            config,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Reconcile the provider's copy of the zone with `desired`
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome::Applied(_))`: every planned operation succeeded
    /// - `Ok(SyncOutcome::Aborted)`: the operator said no, zero operations ran
    /// - `Ok(SyncOutcome::DryRun { .. })`: dry run, the plan was only reported
    /// - `Err(Error)`: lookup or mutation failure
    pub async fn run(&self, desired: &DesiredZone) -> Result<SyncOutcome> {
        info!(zone = %desired.name, provider = self.provider.provider_name(), "synchronising zone");

        let zone_id = self.provider.zone_id(&desired.name).await?;
        debug!(zone = %desired.name, zone_id = %zone_id, "zone resolved");

        let actual: RecordCollection = self.provider.list_records(&zone_id).await?.into();
        debug!(count = actual.len(), "fetched remote records");

        let reconciler = Reconciler::new(&self.config);
        let guard = VersionGuard::new(&desired.name);

        // The sentinel is looked up before type exclusion so that excluding
        // TXT never hides it.
        let (actual, sentinel) = guard.extract(&actual);
        let wanted = guard.strip(&desired.records);

        if sentinel.requires_confirmation() && !self.config.dry_run {
            let prompt = format!(
                "Deployed version ({}) is newer than current version ({}). Continue",
                sentinel.deployed().unwrap_or_default(),
                guard.revision()
            );
            if !self.confirmation.confirm(&prompt)? {
                self.reporter.aborted();
                return Ok(SyncOutcome::Aborted);
            }
        }

        let mut plan = reconciler.plan(&wanted, &actual);

        if !plan.preserved.is_empty() {
            self.reporter.preserved(&plan.preserved);
        }

        let report = ChangeReport {
            deletes: &plan.deletes,
            adds: &plan.adds,
            updates: &plan.updates,
            unchanged: plan.unchanged,
            checksum: &desired.checksum,
        };

        if self.config.dry_run {
            if !plan.is_empty() {
                self.reporter.report(&report);
            }
            info!(zone = %desired.name, changes = plan.total_changes(), "dry run, nothing applied");
            return Ok(SyncOutcome::DryRun {
                changes: plan.total_changes(),
            });
        }

        if !plan.is_empty() && !self.config.skip_confirmation {
            self.reporter.report(&report);

            let prompt = format!("{} change(s). Continue", report.total_changes());
            if !self.confirmation.confirm(&prompt)? {
                self.reporter.aborted();
                return Ok(SyncOutcome::Aborted);
            }
        } else if plan.is_empty() {
            info!(zone = %desired.name, unchanged = plan.unchanged, "zone already in sync");
        }

        guard.inject(&sentinel, &mut plan);

        let summary = Applier::new(self.provider.as_ref(), &zone_id)
            .apply(&plan)
            .await?;
        self.reporter.applied(&summary);

        Ok(SyncOutcome::Applied(summary))
    }
}
