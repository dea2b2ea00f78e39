//! Collaborator traits for zonesync
//!
//! The reconciliation engine only touches the outside world through these
//! interfaces.
//!
//! - [`DnsProvider`]: list and mutate records at a DNS provider
//! - [`Confirmation`]: ask the operator a yes/no question
//! - [`Reporter`]: show the computed changes to the operator

pub mod confirm;
pub mod dns_provider;
pub mod reporter;

pub use confirm::{Confirmation, LineConfirmation};
pub use dns_provider::{DnsProvider, DnsProviderFactory};
pub use reporter::{ChangeReport, Reporter};
