//! Configuration types for zonesync
//!
//! Every option that influences a run is carried explicitly in these
//! structures and handed to the components that need it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::RecordType;

/// Options for one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Apply without showing the change report or asking for confirmation
    #[serde(default)]
    pub skip_confirmation: bool,

    /// Report records unknown to the zone file but never delete them
    #[serde(default)]
    pub preserve_unknown: bool,

    /// Record types treated as if they did not exist remotely
    #[serde(default)]
    pub excluded_types: BTreeSet<RecordType>,

    /// Origin used to resolve `@` and relative names at the top of the file
    #[serde(default)]
    pub origin_override: Option<String>,

    /// Zone file TTL interpreted as "provider automatic"
    #[serde(default = "default_auto_ttl")]
    pub auto_ttl: u32,

    /// Zone file TTL interpreted as "proxied, automatic TTL"
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u32,

    /// Log intended mutations without performing them
    #[serde(default)]
    pub dry_run: bool,
}

impl SyncConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            skip_confirmation: false,
            preserve_unknown: false,
            excluded_types: BTreeSet::new(),
            origin_override: None,
            auto_ttl: default_auto_ttl(),
            cache_ttl: default_cache_ttl(),
            dry_run: false,
        }
    }

    /// Skip the change confirmation prompt
    pub fn with_skip_confirmation(mut self, skip: bool) -> Self {
        self.skip_confirmation = skip;
        self
    }

    /// Keep unknown remote records
    pub fn with_preserve_unknown(mut self, preserve: bool) -> Self {
        self.preserve_unknown = preserve;
        self
    }

    /// Exclude a record type from reconciliation
    pub fn excluding(mut self, record_type: RecordType) -> Self {
        self.excluded_types.insert(record_type);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.auto_ttl != 0 && self.auto_ttl == self.cache_ttl {
            return Err(crate::Error::config(format!(
                "auto TTL and cache TTL must differ (both are {})",
                self.auto_ttl
            )));
        }

        if let Some(origin) = &self.origin_override {
            let trimmed = origin.trim_end_matches('.');
            if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
                return Err(crate::Error::config(format!("Invalid origin: '{}'", origin)));
            }
        }

        Ok(())
    }

    /// Zone file interpretation derived from this configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            origin: self.origin_override.clone(),
            auto_ttl: self.auto_ttl,
            cache_ttl: self.cache_ttl,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_auto_ttl() -> u32 {
    0
}

fn default_cache_ttl() -> u32 {
    1
}

/// How zone file TTLs and names are interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Initial origin, overriding nothing but `$ORIGIN` lines that follow
    pub origin: Option<String>,
    /// TTL meaning "provider automatic"
    pub auto_ttl: u32,
    /// TTL meaning "proxied, provider automatic"
    pub cache_ttl: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        SyncConfig::default().parse_options()
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Scoped API token
        #[serde(default)]
        api_token: Option<String>,
        /// Global API key, used together with `api_email`
        #[serde(default)]
        api_key: Option<String>,
        /// Account e-mail for the global API key
        #[serde(default)]
        api_email: Option<String>,
        /// Skip mutations, only log them
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                api_email,
                ..
            } => {
                let has_key_pair = is_set(api_key) && is_set(api_email);
                if !has_key_pair && !is_set(api_token) {
                    return Err(crate::Error::config(
                        "Cloudflare needs an API token, or an API key and e-mail",
                    ));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}
