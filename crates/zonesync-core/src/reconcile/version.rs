//! Version sentinel handling
//!
//! A TXT record named `zonesync-version.<zone>` stores the revision of the
//! reconciliation logic that last wrote the zone. It is pulled out of the
//! remote records before diffing and written back after the change report,
//! so it never shows up in the diff the operator reviews. A sentinel declared
//! in the zone file is ignored.
//!
//! ```text
//! absent                 -> add a fresh sentinel
//! present, same revision -> nothing
//! present, older         -> update to the current revision
//! present, newer         -> confirmation gate, then as "older"
//! ```

use tracing::{debug, info, warn};

use super::ChangePlan;
use crate::collection::RecordCollection;
use crate::matcher::updatable;
use crate::record::{Record, RecordType, Ttl};

/// Revision of the reconciliation logic.
///
/// Must be bumped whenever a change alters what gets written to a provider,
/// so that older builds refuse to silently undo it.
pub const REVISION: u64 = 2019121201;

/// Leftmost label of the sentinel record name
pub const SENTINEL_LABEL: &str = "zonesync-version";

/// TTL of the sentinel record
pub const SENTINEL_TTL: u32 = 600;

/// What the remote zone says about the last writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentinelState {
    /// No sentinel in the zone
    Absent,
    /// Written by this revision
    Current { record: Record },
    /// Written by an older revision
    Outdated { record: Record, deployed: u64 },
    /// Written by a newer revision
    Newer { record: Record, deployed: u64 },
}

impl SentinelState {
    /// Whether the operator has to approve a possible downgrade
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, SentinelState::Newer { .. })
    }

    /// Revision found in the zone, if any
    pub fn deployed(&self) -> Option<u64> {
        match self {
            SentinelState::Absent => None,
            SentinelState::Current { .. } => Some(REVISION),
            SentinelState::Outdated { deployed, .. } | SentinelState::Newer { deployed, .. } => {
                Some(*deployed)
            }
        }
    }
}

/// Detects, strips, and re-injects the sentinel record for one zone
#[derive(Debug, Clone)]
pub struct VersionGuard {
    sentinel: Record,
    revision: u64,
}

impl VersionGuard {
    /// Guard for `zone_name` at the compiled-in revision
    pub fn new(zone_name: &str) -> Self {
        Self::with_revision(zone_name, REVISION)
    }

    /// Guard for `zone_name` at an explicit revision
    pub fn with_revision(zone_name: &str, revision: u64) -> Self {
        let sentinel = Record::new(
            format!("{}.{}", SENTINEL_LABEL, zone_name),
            RecordType::Txt,
            revision.to_string(),
            Ttl::Seconds(SENTINEL_TTL),
        );

        Self { sentinel, revision }
    }

    /// The sentinel record as this revision writes it
    pub fn sentinel(&self) -> &Record {
        &self.sentinel
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Split the sentinel off the remote records.
    ///
    /// The lookup matches on identity only, the deployed revision is free to
    /// differ. Content that is not a number counts as revision 0.
    pub fn extract(&self, actual: &RecordCollection) -> (RecordCollection, SentinelState) {
        let Some((index, found)) = actual.find(&self.sentinel, updatable) else {
            debug!(name = %self.sentinel.name, "no version sentinel in zone");
            return (actual.clone(), SentinelState::Absent);
        };

        let deployed = parse_revision(&found.content);
        let record = found.clone();
        let remaining = actual.remove(index);

        let state = if deployed > self.revision {
            warn!(deployed, current = self.revision, "zone was written by a newer revision");
            SentinelState::Newer { record, deployed }
        } else if deployed < self.revision {
            debug!(deployed, current = self.revision, "zone was written by an older revision");
            SentinelState::Outdated { record, deployed }
        } else {
            SentinelState::Current { record }
        };

        (remaining, state)
    }

    /// Desired records without any the zone file declares under the
    /// sentinel's name and type. The sentinel is managed here only.
    pub fn strip(&self, desired: &RecordCollection) -> RecordCollection {
        let kept = desired.difference(&RecordCollection::from(vec![self.sentinel.clone()]), updatable);
        if kept.len() != desired.len() {
            warn!(name = %self.sentinel.name, "zone file declares the version sentinel, ignoring it");
        }
        kept
    }

    /// Put the sentinel back into the plan after the report was shown
    pub fn inject(&self, state: &SentinelState, plan: &mut ChangePlan) {
        match state {
            SentinelState::Absent => {
                info!(name = %self.sentinel.name, "adding version sentinel");
                plan.adds.push(self.sentinel.clone());
            }
            SentinelState::Outdated { record, .. } | SentinelState::Newer { record, .. } => {
                info!(name = %self.sentinel.name, revision = self.revision, "updating version sentinel");
                plan.updates.push(self.sentinel.retarget(record.id.clone()));
            }
            SentinelState::Current { .. } => {}
        }
    }
}

fn parse_revision(content: &str) -> u64 {
    content.trim().trim_matches('"').parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinel(content: &str) -> Record {
        Record::new(
            "zonesync-version.example.com",
            RecordType::Txt,
            content,
            Ttl::Seconds(SENTINEL_TTL),
        )
        .with_id("v1")
    }

    fn other() -> Record {
        Record::new("www.example.com", RecordType::A, "1.1.1.1", Ttl::Auto).with_id("r1")
    }

    #[test]
    fn absent_sentinel_is_added() {
        let guard = VersionGuard::new("example.com");
        let actual = RecordCollection::from(vec![other()]);
        let (remaining, state) = guard.extract(&actual);

        assert_eq!(state, SentinelState::Absent);
        assert_eq!(remaining, actual);

        let mut plan = ChangePlan::default();
        guard.inject(&state, &mut plan);
        assert_eq!(plan.adds.len(), 1);
        assert_eq!(plan.adds.iter().next().unwrap().content, REVISION.to_string());
        assert_eq!(plan.adds.iter().next().unwrap().name, "zonesync-version.example.com");
        assert!(plan.updates.is_empty());
    }

    #[test]
    fn current_sentinel_is_left_alone() {
        let guard = VersionGuard::new("example.com");
        let actual = RecordCollection::from(vec![sentinel("2019121201"), other()]);
        let (remaining, state) = guard.extract(&actual);

        assert!(matches!(state, SentinelState::Current { .. }));
        assert_eq!(remaining.len(), 1);
        assert!(!state.requires_confirmation());

        let mut plan = ChangePlan::default();
        guard.inject(&state, &mut plan);
        assert!(plan.is_empty());
    }

    #[test]
    fn outdated_sentinel_is_updated_in_place() {
        let guard = VersionGuard::new("example.com");
        let actual = RecordCollection::from(vec![other(), sentinel("2018010101")]);
        let (remaining, state) = guard.extract(&actual);

        assert_eq!(state.deployed(), Some(2018010101));
        assert_eq!(remaining, RecordCollection::from(vec![other()]));

        let mut plan = ChangePlan::default();
        guard.inject(&state, &mut plan);
        let update = plan.updates.iter().next().unwrap();
        assert_eq!(update.id.as_deref(), Some("v1"));
        assert_eq!(update.content, REVISION.to_string());
    }

    #[test]
    fn newer_sentinel_needs_confirmation() {
        let guard = VersionGuard::new("example.com");
        let actual = RecordCollection::from(vec![sentinel("2030010101")]);
        let (remaining, state) = guard.extract(&actual);

        assert!(remaining.is_empty());
        assert!(state.requires_confirmation());
        assert_eq!(state.deployed(), Some(2030010101));
    }

    #[test]
    fn garbage_revision_counts_as_outdated() {
        let guard = VersionGuard::new("example.com");
        let (_, state) = guard.extract(&RecordCollection::from(vec![sentinel("not-a-number")]));
        assert_eq!(state.deployed(), Some(0));
        assert!(!state.requires_confirmation());
    }

    #[test]
    fn quoted_revision_is_understood() {
        let guard = VersionGuard::new("example.com");
        let (_, state) = guard.extract(&RecordCollection::from(vec![sentinel("\"2019121201\"")]));
        assert!(matches!(state, SentinelState::Current { .. }));
    }

    #[test]
    fn declared_sentinel_is_stripped_from_desired() {
        let guard = VersionGuard::new("example.com");
        let mut declared = sentinel("1");
        declared.id = None;
        let desired = RecordCollection::from(vec![declared, other().retarget(None)]);

        let stripped = guard.strip(&desired);

        assert_eq!(stripped, RecordCollection::from(vec![other().retarget(None)]));
    }

    #[test]
    fn sentinel_of_other_zone_is_ignored() {
        let guard = VersionGuard::new("example.org");
        let (_, state) = guard.extract(&RecordCollection::from(vec![sentinel("2019121201")]));
        assert_eq!(state, SentinelState::Absent);
    }
}
