//! Ordered record container with matcher driven set operations
//!
//! Order is kept from insertion. It carries no meaning for the set
//! operations except that the first matching element always wins.

use std::collections::BTreeSet;
use std::fmt;

use crate::record::{Record, RecordType};

/// An ordered sequence of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Find the first element `e` for which `matcher(e, target)` holds.
    ///
    /// Returns its index alongside it. Absence is a normal outcome.
    pub fn find<M>(&self, target: &Record, matcher: M) -> Option<(usize, &Record)>
    where
        M: Fn(&Record, &Record) -> bool,
    {
        self.records
            .iter()
            .enumerate()
            .find(|(_, candidate)| matcher(*candidate, target))
    }

    /// Elements of `self`, in order, without a match anywhere in `other`
    pub fn difference<M>(&self, other: &RecordCollection, matcher: M) -> RecordCollection
    where
        M: Fn(&Record, &Record) -> bool,
    {
        self.records
            .iter()
            .filter(|record| other.find(*record, &matcher).is_none())
            .cloned()
            .collect()
    }

    /// Elements of `self`, in order, with at least one match in `other`
    pub fn intersect<M>(&self, other: &RecordCollection, matcher: M) -> RecordCollection
    where
        M: Fn(&Record, &Record) -> bool,
    {
        self.records
            .iter()
            .filter(|record| other.find(*record, &matcher).is_some())
            .cloned()
            .collect()
    }

    /// Copy of the collection without the element at `index`.
    ///
    /// An out of range index is a no-op and returns an unchanged copy.
    pub fn remove(&self, index: usize) -> RecordCollection {
        if index >= self.records.len() {
            tracing::debug!(index, len = self.records.len(), "remove index out of range, ignoring");
            return self.clone();
        }

        self.records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Copy of the collection without any record of an excluded type
    pub fn without_types(&self, excluded: &BTreeSet<RecordType>) -> RecordCollection {
        self.records
            .iter()
            .filter(|record| !excluded.contains(&record.record_type))
            .cloned()
            .collect()
    }
}

impl From<Vec<Record>> for RecordCollection {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// One record per line, in collection order
impl fmt::Display for RecordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{full_match, updatable};
    use crate::record::Ttl;

    fn a(name: &str, content: &str) -> Record {
        Record::new(name, RecordType::A, content, Ttl::Seconds(300))
    }

    fn sample() -> RecordCollection {
        RecordCollection::from(vec![
            a("a.example.com", "1.1.1.1"),
            a("b.example.com", "2.2.2.2"),
            a("a.example.com", "3.3.3.3"),
        ])
    }

    #[test]
    fn find_returns_first_match_and_index() {
        let records = sample();
        let (index, found) = records
            .find(&a("a.example.com", "9.9.9.9"), updatable)
            .expect("identity present");
        assert_eq!(index, 0);
        assert_eq!(found.content, "1.1.1.1");

        let (index, _) = records
            .find(&a("a.example.com", "3.3.3.3"), full_match)
            .expect("exact record present");
        assert_eq!(index, 2);

        assert!(records.find(&a("c.example.com", "1.1.1.1"), updatable).is_none());
    }

    #[test]
    fn difference_keeps_order_and_is_asymmetric() {
        let left = sample();
        let right = RecordCollection::from(vec![a("b.example.com", "2.2.2.2")]);

        let diff = left.difference(&right, full_match);
        let contents: Vec<_> = diff.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["1.1.1.1", "3.3.3.3"]);

        assert!(right.difference(&left, full_match).is_empty());
    }

    #[test]
    fn self_difference_is_empty() {
        let records = sample();
        assert!(records.difference(&records, full_match).is_empty());
    }

    #[test]
    fn intersect_and_difference_partition_the_receiver() {
        let left = sample();
        let right = RecordCollection::from(vec![a("a.example.com", "7.7.7.7")]);

        let inter = left.intersect(&right, updatable);
        let diff = left.difference(&right, updatable);
        assert_eq!(inter.len() + diff.len(), left.len());

        // Interleaving both results by receiver order rebuilds the receiver
        let (mut inter_it, mut diff_it) = (inter.iter().peekable(), diff.iter().peekable());
        let mut rebuilt = RecordCollection::new();
        for record in &left {
            if inter_it.peek() == Some(&record) {
                rebuilt.push(inter_it.next().unwrap().clone());
            } else {
                assert_eq!(diff_it.peek(), Some(&record));
                rebuilt.push(diff_it.next().unwrap().clone());
            }
        }
        assert_eq!(rebuilt, left);
        assert_eq!(inter.len(), 2);
    }

    #[test]
    fn remove_drops_only_the_indexed_element() {
        let records = sample();
        let removed = records.remove(0);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed.iter().next().unwrap().name, "b.example.com");
        // receiver untouched
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let records = sample();
        assert_eq!(records.remove(3), records);
    }

    #[test]
    fn without_types_filters_excluded() {
        let mut records = sample();
        records.push(Record::new("_sip._tcp.example.com", RecordType::Srv, "5 5060 sip.example.com", Ttl::Auto));

        let excluded = BTreeSet::from([RecordType::Srv]);
        let kept = records.without_types(&excluded);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.record_type == RecordType::A));
    }

    #[test]
    fn display_lists_in_order() {
        let rendered = sample().to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("1.1.1.1"));
        assert!(lines[2].ends_with("3.3.3.3"));
    }
}
