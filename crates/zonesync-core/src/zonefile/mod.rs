//! Desired state from an RFC 1035 master file
//!
//! Parsing is done by hickory's master file parser; this module maps its
//! record sets onto [`Record`] and applies the TTL policy.
//!
//! The zone name comes from the SOA owner, falling back to the configured
//! origin and then to the origin the parser ended with. SOA records
//! themselves are not synchronised. Records come out grouped by name and
//! type, in file order within a group.
//!
//! ## TTL policy
//!
//! ```text
//! ttl == auto_ttl                      -> Ttl::Auto
//! ttl == cache_ttl, proxiable type     -> Ttl::Auto, proxied
//! anything else                        -> Ttl::Seconds(ttl)
//! ```
//!
//! ## Byte escapes
//!
//! `\DDD` runs are decoded as UTF-8 before the text reaches the parser, so
//! `"caf\195\169"` reads as `café`. A run that is not valid UTF-8 is a
//! parse error.

use std::path::Path;

use hickory_client::rr::{Name, RData, Record as WireRecord};
use hickory_client::serialize::txt::Parser;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::collection::RecordCollection;
use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::record::{normalize_name, Record, RecordType, Ttl};

/// Everything a zone file says about the desired state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredZone {
    /// Zone apex, lower-case, without trailing dot
    pub name: String,
    pub records: RecordCollection,
    /// Lower-case hex SHA-256 of the file contents
    pub checksum: String,
}

impl DesiredZone {
    /// Read and parse a zone file
    pub fn load(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let zone = parse(&text, options)?;
        debug!(
            path = %path.display(),
            zone = %zone.name,
            records = zone.records.len(),
            "zone file loaded"
        );
        Ok(zone)
    }
}

/// Parse zone file text
pub fn parse(text: &str, options: &ParseOptions) -> Result<DesiredZone> {
    let origin = options
        .origin
        .as_deref()
        .map(|origin| {
            Name::from_ascii(format!("{}.", normalize_name(origin)))
                .map_err(|e| Error::config(format!("invalid origin {}: {}", origin, e)))
        })
        .transpose()?;

    let source = decode_byte_escapes(text)?;
    let (parsed_origin, rrsets) = Parser::new(source, None, origin)
        .parse()
        .map_err(|e| Error::parse(e.to_string()))?;

    let mut soa_owner = None;
    let mut records = RecordCollection::new();

    for wire in rrsets.values().flat_map(|rrset| rrset.records_without_rrsigs()) {
        if let Some(RData::SOA(_)) = wire.data() {
            if soa_owner.is_none() {
                debug!(zone = %wire.name(), "zone name taken from SOA");
                soa_owner = Some(normalize_name(&wire.name().to_string()));
            }
            continue;
        }

        if let Some(record) = convert(wire, options)? {
            records.push(record);
        }
    }

    let name = soa_owner
        .or_else(|| options.origin.as_deref().map(normalize_name))
        .unwrap_or_else(|| normalize_name(&parsed_origin.to_string()));

    Ok(DesiredZone {
        name,
        records,
        checksum: checksum(text.as_bytes()),
    })
}

/// Lower-case hex SHA-256 of `bytes`
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn convert(wire: &WireRecord, options: &ParseOptions) -> Result<Option<Record>> {
    let owner = normalize_name(&wire.name().to_string());

    let (record_type, content, priority) = match wire.data() {
        Some(RData::A(address)) => (RecordType::A, address.to_string(), None),
        Some(RData::AAAA(address)) => (RecordType::Aaaa, address.to_string(), None),
        Some(RData::CNAME(target)) => (RecordType::Cname, domain(&target.0), None),
        Some(RData::NS(target)) => (RecordType::Ns, domain(&target.0), None),
        Some(RData::PTR(target)) => (RecordType::Ptr, domain(&target.0), None),
        Some(RData::MX(mx)) => (RecordType::Mx, domain(mx.exchange()), Some(mx.preference())),
        Some(RData::SRV(srv)) => {
            let content = format!("{} {} {}", srv.weight(), srv.port(), domain(srv.target()));
            (RecordType::Srv, content, Some(srv.priority()))
        }
        Some(RData::TXT(txt)) => (RecordType::Txt, text_content(&owner, txt.txt_data())?, None),
        Some(RData::SPF(spf)) => (RecordType::Spf, text_content(&owner, spf.txt_data())?, None),
        Some(RData::CAA(caa)) => {
            let flags = if caa.issuer_critical() { 128 } else { 0 };
            let value = caa.value().to_string();
            let content = format!("{} {} \"{}\"", flags, caa.tag(), value.trim_matches('"'));
            (RecordType::Caa, content, None)
        }
        Some(_) => {
            warn!(name = %owner, record_type = %wire.record_type(), "unsupported record type, skipping");
            return Ok(None);
        }
        None => return Ok(None),
    };

    let (ttl, proxied) = ttl_policy(options, record_type, wire.ttl());

    let mut record = Record::new(owner, record_type, content, ttl);
    if let Some(priority) = priority {
        record = record.with_priority(priority);
    }
    if let Some(proxied) = proxied {
        record = record.with_proxied(proxied);
    }
    Ok(Some(record))
}

fn ttl_policy(options: &ParseOptions, record_type: RecordType, seconds: u32) -> (Ttl, Option<bool>) {
    if seconds == options.auto_ttl {
        (Ttl::Auto, None)
    } else if seconds == options.cache_ttl && record_type.is_proxiable() {
        (Ttl::Auto, Some(true))
    } else {
        (Ttl::Seconds(seconds), None)
    }
}

fn domain(name: &Name) -> String {
    normalize_name(&name.to_string())
}

fn text_content(owner: &str, strings: &[Box<[u8]>]) -> Result<String> {
    let bytes: Vec<u8> = strings.iter().flat_map(|s| s.iter().copied()).collect();
    String::from_utf8(bytes).map_err(|_| Error::parse(format!("{}: text is not valid UTF-8", owner)))
}

/// Rewrite runs of `\DDD` escapes as the characters they encode
fn decode_byte_escapes(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                out.push(c);
            }
            ';' if !quoted => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(next);
                    chars.next();
                }
            }
            '\\' => {
                let mut bytes = Vec::new();
                let mut first = true;
                loop {
                    if !first {
                        if chars.peek() != Some(&'\\') {
                            break;
                        }
                        chars.next();
                    }
                    first = false;

                    let digits: String = chars.clone().take(3).collect();
                    if digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) {
                        let value: u16 = digits
                            .parse()
                            .map_err(|_| Error::parse(format!("invalid escape \\{}", digits)))?;
                        let byte = u8::try_from(value)
                            .map_err(|_| Error::parse(format!("escape \\{} out of range", digits)))?;
                        bytes.push(byte);
                        chars.nth(2);
                    } else {
                        flush_bytes(&mut out, &mut bytes, quoted)?;
                        out.push('\\');
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    }
                }
                flush_bytes(&mut out, &mut bytes, quoted)?;
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn flush_bytes(out: &mut String, bytes: &mut Vec<u8>, quoted: bool) -> Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    let decoded = std::str::from_utf8(bytes)
        .map_err(|_| Error::parse(format!("escaped bytes {:?} are not valid UTF-8", bytes)))?;

    for c in decoded.chars() {
        if c.is_ascii_control() {
            out.push_str(&format!("\\{:03}", c as u32));
        } else if quoted {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        } else {
            if c.is_ascii() && !c.is_ascii_alphanumeric() {
                out.push('\\');
            }
            out.push(c);
        }
    }
    bytes.clear();
    Ok(())
}
