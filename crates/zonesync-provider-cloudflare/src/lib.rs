// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for zonesync.
//
// ## Behaviour
//
// - One HTTP request per provider operation, except listing which follows
//   pagination
// - Full error propagation to the engine (no retries, no backoff)
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401, 403, 404, 409, 429, 5xx)
// - Dry-run mode for safe testing
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or Debug output
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=...&per_page=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

pub mod types;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use zonesync_core::config::ProviderConfig;
use zonesync_core::traits::{DnsProvider, DnsProviderFactory};
use zonesync_core::{Error, Record, Result};

use types::{CloudflareResponse, DnsRecordJson, DnsRecordPayload, IdJson, ZoneJson};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest page size the DNS records endpoint accepts
const RECORDS_PER_PAGE: u32 = 100;

const PROVIDER: &str = "cloudflare";

/// Cloudflare credentials
#[derive(Clone, PartialEq, Eq)]
pub enum CloudflareAuth {
    /// Scoped API token, sent as a bearer token
    Token(String),
    /// Global API key with the account e-mail
    Key { key: String, email: String },
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for CloudflareAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloudflareAuth::Token(_) => f.write_str("Token(<REDACTED>)"),
            CloudflareAuth::Key { .. } => f
                .debug_struct("Key")
                .field("key", &"<REDACTED>")
                .field("email", &"<REDACTED>")
                .finish(),
        }
    }
}

impl CloudflareAuth {
    fn is_empty(&self) -> bool {
        match self {
            CloudflareAuth::Token(token) => token.is_empty(),
            CloudflareAuth::Key { key, email } => key.is_empty() || email.is_empty(),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            CloudflareAuth::Token(token) => request.bearer_auth(token),
            CloudflareAuth::Key { key, email } => request
                .header("X-Auth-Key", key)
                .header("X-Auth-Email", email),
        }
    }
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PUT/DELETE payload
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation does NOT expose the credentials.
pub struct CloudflareProvider {
    /// ⚠️ NEVER log this value
    auth: CloudflareAuth,

    /// API root, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip mutations
    dry_run: bool,

    /// Source of placeholder ids handed out in dry-run mode
    dry_run_ids: AtomicUsize,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("auth", &self.auth)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// `Error::Config` when the credentials are empty, `Error::Http` when the
    /// HTTP client cannot be built.
    pub fn new(auth: CloudflareAuth, dry_run: bool) -> Result<Self> {
        if auth.is_empty() {
            return Err(Error::config("Cloudflare credentials cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            auth,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
            dry_run_ids: AtomicUsize::new(0),
        })
    }

    /// Point the provider at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "cloudflare request");
        self.auth.apply(self.client.request(method, url))
    }

    /// Send a request and unwrap the Cloudflare envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<CloudflareResponse<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: HTTP request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        if !status.is_success() {
            return Err(status_error(status, &body, what));
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!("{}: {}", what, envelope.error_message()),
            ));
        }

        Ok(envelope)
    }

    fn dry_run_id(&self) -> String {
        format!("dry-run-{}", self.dry_run_ids.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Map HTTP status codes to specific errors
fn status_error(status: StatusCode, body: &str, what: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid credentials or insufficient permissions. Status: {}",
            what, status
        )),
        404 => Error::not_found(format!("{}: {}", what, status)),
        409 => Error::provider(
            PROVIDER,
            format!("{}: conflict with an existing record. Status: {} - {}", what, status, body),
        ),
        429 => Error::rate_limited(format!(
            "{}: rate limit exceeded, retry later. Status: {}",
            what, status
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("{}: Cloudflare server error (transient): {} - {}", what, status, body),
        ),
        _ => Error::provider(PROVIDER, format!("{}: {} - {}", what, status, body)),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        let request = self
            .request(Method::GET, "/zones")
            .query(&[("name", zone_name)]);
        let response: CloudflareResponse<Vec<ZoneJson>> = self.send(request, "zone lookup").await?;

        let zone = response
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone_name)))?;

        debug!(zone = %zone.name, zone_id = %zone.id, "found zone");
        Ok(zone.id)
    }

    /// Every record of the zone, following pagination
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        let path = format!("/zones/{}/dns_records", zone_id);
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self.request(Method::GET, &path).query(&[
                ("page", page.to_string()),
                ("per_page", RECORDS_PER_PAGE.to_string()),
            ]);
            let response: CloudflareResponse<Vec<DnsRecordJson>> =
                self.send(request, "record listing").await?;

            let batch = response.result.unwrap_or_default();
            debug!(page, count = batch.len(), "fetched record page");
            let empty = batch.is_empty();
            records.extend(batch.into_iter().filter_map(DnsRecordJson::into_record));

            let total_pages = response.result_info.map_or(page, |info| info.total_pages);
            if empty || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    async fn create_record(&self, zone_id: &str, record: &Record) -> Result<String> {
        let payload = DnsRecordPayload::from_record(record)?;

        if self.dry_run {
            info!(
                "[DRY-RUN] Would POST /zones/{}/dns_records with payload: {}",
                zone_id,
                serde_json::to_string(&payload)?
            );
            return Ok(self.dry_run_id());
        }

        let request = self
            .request(Method::POST, &format!("/zones/{}/dns_records", zone_id))
            .json(&payload);
        let response: CloudflareResponse<IdJson> = self.send(request, "record creation").await?;

        let id = response
            .result
            .map(|created| created.id)
            .ok_or_else(|| Error::provider(PROVIDER, "record creation: response carries no id"))?;

        info!(record = %record, id = %id, "record created");
        Ok(id)
    }

    async fn update_record(&self, zone_id: &str, record_id: &str, record: &Record) -> Result<()> {
        let payload = DnsRecordPayload::from_record(record)?;
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);

        if self.dry_run {
            info!(
                "[DRY-RUN] Would PUT {} with payload: {}",
                path,
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        let request = self.request(Method::PUT, &path).json(&payload);
        let _: CloudflareResponse<serde_json::Value> = self.send(request, "record update").await?;

        info!(record = %record, id = %record_id, "record updated");
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);

        if self.dry_run {
            info!("[DRY-RUN] Would DELETE {}", path);
            return Ok(());
        }

        let request = self.request(Method::DELETE, &path);
        let _: CloudflareResponse<IdJson> = self.send(request, "record deletion").await?;

        info!(id = %record_id, "record deleted");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let ProviderConfig::Cloudflare {
            api_token,
            api_key,
            api_email,
            dry_run,
        } = config
        else {
            return Err(Error::config("Invalid config for Cloudflare provider"));
        };

        let nonempty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        // The global key wins when both kinds of credentials are present.
        let auth = match (nonempty(api_key), nonempty(api_email), nonempty(api_token)) {
            (Some(key), Some(email), _) => CloudflareAuth::Key { key, email },
            (_, _, Some(token)) => CloudflareAuth::Token(token),
            _ => {
                return Err(Error::config(
                    "Cloudflare needs an API token, or an API key and e-mail",
                ));
            }
        };

        if *dry_run {
            warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Box::new(CloudflareProvider::new(auth, *dry_run)?))
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonesync_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &zonesync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER, Box::new(CloudflareFactory));
}
