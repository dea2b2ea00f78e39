// # zonesync-core
//
// Core library for reconciling a DNS zone file against a provider.
//
// ## Architecture Overview
//
// - **Record / RecordCollection**: the data model and its set operations
// - **Matchers**: `full_match` and `updatable` record comparison
// - **Reconciler**: computes deletes, adds, and updates
// - **VersionGuard**: version sentinel protocol against downgrades
// - **SyncEngine**: orchestrates fetch, diff, report, confirm, apply
// - **DnsProvider**: trait for the provider holding the live zone
// - **ProviderRegistry**: plugin-based registry for DNS providers
// - **zonefile**: desired state from an RFC 1035 master file
//
// ## Design Principles
//
// 1. **Pure core**: diffing has no I/O and cannot fail
// 2. **Plugin-Based**: providers are registered dynamically
// 3. **Library-First**: the binary is a thin shell over this crate
// 4. **Fail-fast**: the first provider error stops the run

pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod traits;
pub mod zonefile;

// Re-export core types for convenience
pub use collection::RecordCollection;
pub use config::{ParseOptions, ProviderConfig, SyncConfig};
pub use engine::{ApplySummary, SyncEngine, SyncOutcome};
pub use error::{Error, Result};
pub use matcher::{full_match, updatable, Matcher};
pub use reconcile::{ChangePlan, Reconciler, SentinelState, VersionGuard, REVISION};
pub use record::{Record, RecordType, Ttl};
pub use registry::ProviderRegistry;
pub use traits::{ChangeReport, Confirmation, DnsProvider, DnsProviderFactory, LineConfirmation, Reporter};
pub use zonefile::DesiredZone;
