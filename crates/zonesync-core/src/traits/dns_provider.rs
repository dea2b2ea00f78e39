// # DNS Provider Trait
//
// Defines the interface for reading and mutating the records of one zone at
// a DNS provider.
//
// ## Implementations
//
// - Cloudflare: `zonesync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::DnsProvider;
//
// async fn dump(provider: &dyn DnsProvider) -> zonesync_core::Result<()> {
//     let zone_id = provider.zone_id("example.com").await?;
//     for record in provider.list_records(&zone_id).await? {
//         println!("{}", record);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::Record;

/// Trait for DNS provider implementations
///
/// Each method performs one logical provider operation and reports failure
/// to the caller. Providers do not retry, batch, or decide what needs to
/// change; the engine owns those decisions and treats every mutation error
/// as fatal to the run.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name to the provider's zone identifier
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone identifier
    /// - `Err(Error::NotFound)`: If the provider does not host the zone
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List every record currently held for the zone
    ///
    /// Returned records carry their provider `id`.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, crate::Error>;

    /// Create a record, returning the identifier assigned by the provider
    ///
    /// The record's own `id` is ignored.
    async fn create_record(&self, zone_id: &str, record: &Record) -> Result<String, crate::Error>;

    /// Replace the attributes of an existing record
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &Record,
    ) -> Result<(), crate::Error>;

    /// Delete an existing record
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
