//! Test doubles and common utilities for contract tests
//!
//! The doubles share their state through `Arc`s so a test can hand one copy
//! to the engine and keep another for assertions.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zonesync_core::error::{Error, Result};
use zonesync_core::traits::{ChangeReport, Confirmation, DnsProvider, Reporter};
use zonesync_core::{
    ApplySummary, DesiredZone, Record, RecordCollection, RecordType, SyncConfig, SyncEngine, Ttl,
};

pub const ZONE: &str = "example.com";
pub const ZONE_ID: &str = "zone-1";

/// One provider call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete(String),
    Create(String),
    Update(String),
}

/// An in-memory DnsProvider that applies operations to its own record list
pub struct MockDnsProvider {
    records: Arc<Mutex<Vec<Record>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    next_id: Arc<AtomicUsize>,
    /// Fail the mutation with this 1-based sequence number
    fail_at: Arc<Mutex<Option<usize>>>,
    pub name: &'static str,
}

impl MockDnsProvider {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(1000)),
            fail_at: Arc::new(Mutex::new(None)),
            name: "mock",
        }
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            calls: Arc::clone(&other.calls),
            next_id: Arc::clone(&other.next_id),
            fail_at: Arc::clone(&other.fail_at),
            name: other.name,
        }
    }

    /// Make the n-th mutation (1-based) fail
    pub fn fail_at(&self, n: usize) {
        *self.fail_at.lock().unwrap() = Some(n);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Current remote records, without ids
    pub fn snapshot(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.retarget(None))
            .collect()
    }

    fn record_call(&self, call: Call) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if *self.fail_at.lock().unwrap() == Some(calls.len()) {
            return Err(Error::provider(self.name, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        if zone_name == ZONE {
            Ok(ZONE_ID.to_string())
        } else {
            Err(Error::not_found(format!("zone {}", zone_name)))
        }
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        assert_eq!(zone_id, ZONE_ID);
        Ok(self.records.lock().unwrap().clone())
    }

    async fn create_record(&self, _zone_id: &str, record: &Record) -> Result<String> {
        self.record_call(Call::Create(record.to_string()))?;
        let id = format!("id-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.records
            .lock()
            .unwrap()
            .push(record.retarget(Some(id.clone())));
        Ok(id)
    }

    async fn update_record(&self, _zone_id: &str, record_id: &str, record: &Record) -> Result<()> {
        self.record_call(Call::Update(record.to_string()))?;
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(record_id))
            .ok_or_else(|| Error::not_found(record_id.to_string()))?;
        *slot = record.retarget(Some(record_id.to_string()));
        Ok(())
    }

    async fn delete_record(&self, _zone_id: &str, record_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let index = records
            .iter()
            .position(|r| r.id.as_deref() == Some(record_id))
            .ok_or_else(|| Error::not_found(record_id.to_string()))?;
        drop(records);
        self.record_call(Call::Delete(record_id.to_string()))?;
        self.records.lock().unwrap().remove(index);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

/// Confirmation that replays scripted answers and remembers the prompts
#[derive(Clone, Default)]
pub struct ScriptedConfirmation {
    answers: Arc<Mutex<VecDeque<bool>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirmation {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.iter().copied().collect())),
            prompts: Arc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        // Running out of answers behaves like end of input: no.
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

/// What a RecordingReporter saw
#[derive(Debug, Clone, Default)]
pub struct Seen {
    pub preserved: Option<usize>,
    pub deletes: Vec<Record>,
    pub adds: Vec<Record>,
    pub updates: Vec<Record>,
    pub unchanged: Option<usize>,
    pub checksum: Option<String>,
    pub reports: usize,
    pub aborted: bool,
    pub applied: Option<ApplySummary>,
}

#[derive(Clone, Default)]
pub struct RecordingReporter {
    seen: Arc<Mutex<Seen>>,
}

impl RecordingReporter {
    pub fn seen(&self) -> Seen {
        self.seen.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn preserved(&self, records: &RecordCollection) {
        self.seen.lock().unwrap().preserved = Some(records.len());
    }

    fn report(&self, report: &ChangeReport<'_>) {
        let mut seen = self.seen.lock().unwrap();
        seen.reports += 1;
        seen.deletes = report.deletes.iter().cloned().collect();
        seen.adds = report.adds.iter().cloned().collect();
        seen.updates = report.updates.iter().cloned().collect();
        seen.unchanged = Some(report.unchanged);
        seen.checksum = Some(report.checksum.to_string());
    }

    fn aborted(&self) {
        self.seen.lock().unwrap().aborted = true;
    }

    fn applied(&self, summary: &ApplySummary) {
        self.seen.lock().unwrap().applied = Some(*summary);
    }
}

/// Engine wired to clones of the given doubles
pub fn engine(
    provider: &MockDnsProvider,
    confirmation: &ScriptedConfirmation,
    reporter: &RecordingReporter,
    config: SyncConfig,
) -> SyncEngine {
    SyncEngine::new(
        Box::new(MockDnsProvider::sharing_counters_with(provider)),
        Box::new(confirmation.clone()),
        Box::new(reporter.clone()),
        config,
    )
    .expect("engine construction succeeds")
}

pub fn a(name: &str, content: &str, ttl: u32) -> Record {
    Record::new(name, RecordType::A, content, Ttl::Seconds(ttl))
}

pub fn txt(name: &str, content: &str, ttl: u32) -> Record {
    Record::new(name, RecordType::Txt, content, Ttl::Seconds(ttl))
}

/// Remote version sentinel with the given content
pub fn sentinel(content: &str, id: &str) -> Record {
    txt("zonesync-version.example.com", content, 600).with_id(id)
}

pub fn remote(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| if r.id.is_some() { r } else { r.with_id(format!("r{}", i + 1)) })
        .collect()
}

/// Desired zone for example.com with a fixed checksum
pub fn desired(records: Vec<Record>) -> DesiredZone {
    DesiredZone {
        name: ZONE.to_string(),
        records: records.into(),
        checksum: "c0ffee".to_string(),
    }
}
