//! Cloudflare API v4 wire types and their mapping onto [`Record`]

use serde::{Deserialize, Serialize};
use tracing::warn;
use zonesync_core::record::normalize_name;
use zonesync_core::{Error, Record, RecordType, Result, Ttl};

/// Cloudflare's wire value for "automatic" TTL
pub const AUTO_TTL: u32 = 1;

/// Envelope around every Cloudflare API response
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    pub result_info: Option<ResultInfo>,
}

impl<T> CloudflareResponse<T> {
    /// First error message, or a generic one
    pub fn error_message(&self) -> String {
        self.errors
            .first()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultInfo {
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub struct ZoneJson {
    pub id: String,
    pub name: String,
}

/// Object carrying only the id, as returned by create and delete
#[derive(Debug, Deserialize)]
pub struct IdJson {
    pub id: String,
}

/// A DNS record as Cloudflare reports it
#[derive(Debug, Deserialize)]
pub struct DnsRecordJson {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub priority: Option<u16>,
    pub proxied: Option<bool>,
    pub data: Option<SrvData>,
}

/// Structured SRV payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvData {
    #[serde(default)]
    pub priority: Option<u16>,
    #[serde(default)]
    pub weight: Option<u16>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub target: Option<String>,
}

impl DnsRecordJson {
    /// Map onto the common record model.
    ///
    /// Returns `None` for record types zonesync does not manage.
    pub fn into_record(self) -> Option<Record> {
        let Ok(record_type) = self.record_type.parse::<RecordType>() else {
            warn!(name = %self.name, record_type = %self.record_type, "skipping unsupported record type");
            return None;
        };

        let ttl = if self.ttl == AUTO_TTL {
            Ttl::Auto
        } else {
            Ttl::Seconds(self.ttl)
        };

        let mut priority = self.priority;
        let content = match record_type {
            RecordType::Srv => match &self.data {
                Some(SrvData {
                    priority: data_priority,
                    weight: Some(weight),
                    port: Some(port),
                    target: Some(target),
                }) => {
                    priority = priority.or(*data_priority);
                    format!("{} {} {}", weight, port, normalize_name(target))
                }
                _ => srv_content(&self.content),
            },
            t if t.has_domain_content() => normalize_name(&self.content),
            t if t.has_text_content() => unquote_text(&self.content),
            _ => self.content,
        };

        let mut record = Record::new(self.name, record_type, content, ttl).with_id(self.id);
        if record_type.has_priority() {
            if let Some(priority) = priority {
                record = record.with_priority(priority);
            }
        }
        if record_type.is_proxiable() {
            record = record.with_proxied(self.proxied.unwrap_or(false));
        }
        Some(record)
    }
}

/// Request body for create and update
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DnsRecordPayload {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SrvData>,
}

impl DnsRecordPayload {
    pub fn from_record(record: &Record) -> Result<Self> {
        let ttl = match record.ttl {
            Ttl::Auto => AUTO_TTL,
            Ttl::Seconds(seconds) => seconds,
        };

        let data = if record.record_type == RecordType::Srv {
            let mut fields = record.content.split_whitespace();
            let (Some(weight), Some(port), Some(target), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(Error::invalid_input(format!(
                    "SRV content must be 'weight port target': {}",
                    record.content
                )));
            };
            let number = |value: &str, what: &str| {
                value
                    .parse::<u16>()
                    .map_err(|_| Error::invalid_input(format!("invalid SRV {}: {}", what, value)))
            };
            Some(SrvData {
                priority: Some(record.priority.unwrap_or_default()),
                weight: Some(number(weight, "weight")?),
                port: Some(number(port, "port")?),
                target: Some(target.to_string()),
            })
        } else {
            None
        };

        Ok(Self {
            record_type: record.record_type,
            name: record.name.clone(),
            content: record.content.clone(),
            ttl,
            priority: record.priority.filter(|_| record.record_type.has_priority()),
            proxied: record.proxied.filter(|_| record.record_type.is_proxiable()),
            data,
        })
    }
}

/// SRV content as `weight port target`, dropping a leading priority if present
fn srv_content(content: &str) -> String {
    let fields: Vec<&str> = content.split_whitespace().collect();
    match fields.as_slice() {
        [_, weight, port, target] | [weight, port, target] => {
            format!("{} {} {}", weight, port, normalize_name(target))
        }
        _ => content.to_string(),
    }
}

/// Strip the quoting Cloudflare may add around TXT character-strings
fn unquote_text(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('"') || !trimmed.ends_with('"') {
        return content.to_string();
    }

    trimmed[1..trimmed.len() - 1]
        .split("\" \"")
        .map(|part| part.replace("\\\"", "\""))
        .collect()
}
