//! Record equivalence predicates
//!
//! Matchers are plain functions so they can be handed to the generic
//! [`RecordCollection`](crate::collection::RecordCollection) operations as
//! values. Both are total and never match records of different types.

use crate::record::Record;

/// Signature shared by all matchers
pub type Matcher = fn(&Record, &Record) -> bool;

/// True when every declared attribute is equal.
///
/// The provider `id` is ignored.
pub fn full_match(a: &Record, b: &Record) -> bool {
    a.record_type == b.record_type
        && a.name == b.name
        && a.content == b.content
        && a.ttl == b.ttl
        && a.priority == b.priority
        && a.proxied == b.proxied
}

/// True when both records share the identity key (name and type).
///
/// Such records denote the same logical record and one can be updated in
/// place to look like the other. Several values under one name (multiple A
/// records, for example) all share a key; pairing between them is decided
/// by collection order.
pub fn updatable(a: &Record, b: &Record) -> bool {
    a.record_type == b.record_type && a.name == b.name
}
