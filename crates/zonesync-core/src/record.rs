//! DNS record value type
//!
//! A [`Record`] is a plain value snapshot. The provider `id` is carried
//! along so updates and deletes can target the remote record, but it never
//! takes part in comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// DNS record type managed by zonesync
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Spf,
    Srv,
    Txt,
}

impl RecordType {
    /// All supported record types
    pub const ALL: [RecordType; 10] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Caa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Spf,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// Wire/zone file tag
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }

    /// Types the provider can put behind its proxy
    pub fn is_proxiable(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa | RecordType::Cname)
    }

    /// Types carrying a separate priority field
    pub fn has_priority(&self) -> bool {
        matches!(self, RecordType::Mx | RecordType::Srv)
    }

    /// Types whose content is a single domain name
    pub fn has_domain_content(&self) -> bool {
        matches!(
            self,
            RecordType::Cname | RecordType::Mx | RecordType::Ns | RecordType::Ptr
        )
    }

    /// Types whose content is one or more character-strings
    pub fn has_text_content(&self) -> bool {
        matches!(self, RecordType::Txt | RecordType::Spf)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_input(format!("Unsupported record type: {}", s)))
    }
}

/// Record time-to-live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ttl {
    /// Let the provider pick the TTL
    #[default]
    Auto,
    /// Explicit TTL in seconds
    Seconds(u32),
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Auto => f.write_str("auto"),
            Ttl::Seconds(secs) => write!(f, "{}", secs),
        }
    }
}

/// One DNS resource record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider assigned identifier, `None` for desired records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Fully qualified name, lower-case, without trailing dot
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record payload
    pub content: String,

    /// Time-to-live
    #[serde(default)]
    pub ttl: Ttl,

    /// MX/SRV priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    /// Proxy flag for proxiable types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

impl Record {
    /// Create a record without id or type-specific metadata.
    ///
    /// Proxiable types start out unproxied so they compare equal to what the
    /// provider reports for a plain record.
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        content: impl Into<String>,
        ttl: Ttl,
    ) -> Self {
        Self {
            id: None,
            name: normalize_name(&name.into()),
            record_type,
            content: content.into(),
            ttl,
            priority: None,
            proxied: record_type.is_proxiable().then_some(false),
        }
    }

    /// Attach a provider id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the MX/SRV priority
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the proxy flag
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = Some(proxied);
        self
    }

    /// Copy of this record's declared attributes aimed at another remote id
    pub fn retarget(&self, id: Option<String>) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\tIN\t{}\t",
            self.name, self.ttl, self.record_type
        )?;
        if let Some(priority) = self.priority {
            write!(f, "{} ", priority)?;
        }
        if self.record_type.has_text_content() {
            write!(f, "\"{}\"", self.content.replace('"', "\\\""))?;
        } else {
            f.write_str(&self.content)?;
        }
        if self.proxied == Some(true) {
            f.write_str(" ; proxied")?;
        }
        Ok(())
    }
}

/// Lower-case a name and strip the trailing root dot
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
