//! Three-way diff between desired and actual records
//!
//! ## Algorithm
//!
//! ```text
//! add candidates    = desired − actual          (full_match)
//! delete candidates = actual  − desired         (full_match)
//! updates           = delete candidates paired with add candidates (updatable)
//! adds              = add candidates left unpaired
//! deletes           = delete candidates left unpaired
//! ```
//!
//! Pairing walks the delete candidates in order and takes, for each one, the
//! first still unpaired add candidate with the same identity key. An update
//! carries the desired attributes and the remote `id`.
//!
//! Pairing is one-for-one rather than "drop every add candidate that shares
//! an identity with some update". When a name and type holds more desired
//! values than remote ones, the surplus stays in `adds`, so `adds` and
//! `updates` may share an identity key (`2.2.2.2` updated in place and
//! `3.3.3.3` added under the same A name). Each remote record is still
//! touched at most once, and a second run finds nothing to do.
//!
//! The diff is pure and cannot fail.

pub mod version;

pub use version::{SentinelState, VersionGuard, REVISION};

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::collection::RecordCollection;
use crate::config::SyncConfig;
use crate::matcher::{full_match, updatable};
use crate::record::RecordType;

/// Result of reconciling desired against actual records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePlan {
    /// Remote records to delete, by remote id
    pub deletes: RecordCollection,
    /// Desired records to create
    pub adds: RecordCollection,
    /// Desired attributes aimed at existing remote ids
    pub updates: RecordCollection,
    /// Remote records fully matching the zone file
    pub unchanged: usize,
    /// Delete candidates kept because unknown records are preserved
    pub preserved: RecordCollection,
}

impl ChangePlan {
    /// Number of provider operations the plan will perform
    pub fn total_changes(&self) -> usize {
        self.deletes.len() + self.adds.len() + self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

/// Computes change plans under the run's policy options
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    preserve_unknown: bool,
    excluded_types: BTreeSet<RecordType>,
}

impl Reconciler {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            preserve_unknown: config.preserve_unknown,
            excluded_types: config.excluded_types.clone(),
        }
    }

    /// Drop records of excluded types.
    ///
    /// Applied to the remote records before anything else looks at them, so
    /// excluded records are never added, updated, or deleted.
    pub fn exclude(&self, records: &RecordCollection) -> RecordCollection {
        if self.excluded_types.is_empty() {
            return records.clone();
        }

        let kept = records.without_types(&self.excluded_types);
        if kept.len() != records.len() {
            debug!(
                excluded = records.len() - kept.len(),
                "ignoring records of excluded types"
            );
        }
        kept
    }

    /// Compute the plan, applying exclusion and the preserve policy.
    ///
    /// `actual` must no longer contain the version sentinel.
    pub fn plan(&self, desired: &RecordCollection, actual: &RecordCollection) -> ChangePlan {
        let managed = self.exclude(desired);
        if managed.len() != desired.len() {
            warn!(
                skipped = desired.len() - managed.len(),
                "zone file declares records of excluded types, leaving them alone"
            );
        }

        let mut plan = diff(&managed, &self.exclude(actual));

        if self.preserve_unknown && !plan.deletes.is_empty() {
            plan.preserved = std::mem::take(&mut plan.deletes);
        }

        plan
    }
}

/// The bare three-way diff, without any policy applied
pub fn diff(desired: &RecordCollection, actual: &RecordCollection) -> ChangePlan {
    let add_candidates = desired.difference(actual, full_match);
    let delete_candidates = actual.difference(desired, full_match);

    let mut unpaired = add_candidates;
    let mut updates = RecordCollection::new();
    let mut deletes = RecordCollection::new();

    for current in &delete_candidates {
        let paired = unpaired
            .find(current, updatable)
            .map(|(index, wanted)| (index, wanted.retarget(current.id.clone())));

        match paired {
            Some((index, update)) => {
                debug!(record = %update, "update in place");
                updates.push(update);
                unpaired = unpaired.remove(index);
            }
            None => deletes.push(current.clone()),
        }
    }

    ChangePlan {
        deletes,
        adds: unpaired,
        updates,
        unchanged: actual.len() - delete_candidates.len(),
        preserved: RecordCollection::new(),
    }
}
