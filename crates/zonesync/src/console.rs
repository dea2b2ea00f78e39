//! Terminal rendering of reconciliation runs

use std::io::{Stdout, Write};
use std::sync::Mutex;

use tracing::warn;
use zonesync_core::{ApplySummary, ChangeReport, RecordCollection, Reporter};

/// Reporter writing the plain-text change listing
///
/// Write failures are logged and otherwise ignored; the confirmation prompt
/// that follows a report fails loudly on a broken terminal anyway.
pub struct ConsoleReporter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    fn emit(&self, render: impl FnOnce(&mut W) -> std::io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = render(&mut out).and_then(|_| out.flush()) {
            warn!("Failed to write report: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

fn section(out: &mut impl Write, title: &str, records: &RecordCollection) -> std::io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", title)?;
    write!(out, "{}", records)?;
    writeln!(out)
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn preserved(&self, records: &RecordCollection) {
        self.emit(|out| writeln!(out, "{} unknown records left untouched", records.len()));
    }

    fn report(&self, report: &ChangeReport<'_>) {
        self.emit(|out| {
            section(out, "Records to delete", report.deletes)?;
            section(out, "Records to add", report.adds)?;
            section(out, "Records to update", report.updates)?;

            writeln!(out, "Summary:")?;
            writeln!(out, "SHA256 zone checksum: {}", report.checksum)?;
            writeln!(out, "Records to delete: {}", report.deletes.len())?;
            writeln!(out, "Records to add: {}", report.adds.len())?;
            writeln!(out, "Records to update: {}", report.updates.len())?;
            writeln!(out, "Unchanged records: {}", report.unchanged)
        });
    }

    fn aborted(&self) {
        self.emit(|out| writeln!(out, "Aborting..."));
    }

    fn applied(&self, summary: &ApplySummary) {
        if summary.total() == 0 {
            return;
        }
        self.emit(|out| {
            writeln!(
                out,
                "Deleted {}, added {}, updated {} record(s)",
                summary.deleted, summary.created, summary.updated
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonesync_core::{Record, RecordType, Ttl};

    fn a(name: &str, content: &str) -> Record {
        Record::new(name, RecordType::A, content, Ttl::Seconds(300))
    }

    fn rendered(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn report_lists_sections_then_summary() {
        let deletes = RecordCollection::from(vec![a("old.example.com", "1.1.1.1")]);
        let adds = RecordCollection::new();
        let updates = RecordCollection::from(vec![a("www.example.com", "2.2.2.2")]);

        let reporter = ConsoleReporter::new(Vec::new());
        reporter.report(&ChangeReport {
            deletes: &deletes,
            adds: &adds,
            updates: &updates,
            unchanged: 4,
            checksum: "abc123",
        });

        let expected = format!(
            "Records to delete:\n{}\n\nRecords to update:\n{}\n\nSummary:\n\
             SHA256 zone checksum: abc123\n\
             Records to delete: 1\n\
             Records to add: 0\n\
             Records to update: 1\n\
             Unchanged records: 4\n",
            a("old.example.com", "1.1.1.1"),
            a("www.example.com", "2.2.2.2"),
        );
        assert_eq!(rendered(reporter), expected);
    }

    #[test]
    fn preserved_and_aborted_lines() {
        let reporter = ConsoleReporter::new(Vec::new());
        reporter.preserved(&RecordCollection::from(vec![
            a("a.example.com", "1.1.1.1"),
            a("b.example.com", "2.2.2.2"),
        ]));
        reporter.aborted();

        assert_eq!(
            rendered(reporter),
            "2 unknown records left untouched\nAborting...\n"
        );
    }

    #[test]
    fn empty_apply_is_silent() {
        let reporter = ConsoleReporter::new(Vec::new());
        reporter.applied(&ApplySummary::default());
        assert!(rendered(reporter).is_empty());
    }
}
