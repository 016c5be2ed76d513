use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipOutcome {
    Found,
    Missing,
    ParseError,
}

/// Per-run counters, printed once the pass is done.
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    run_id: String,
    rows: usize,
    records: usize,
    emails: usize,
    urls: usize,
    zip_found: usize,
    zip_missing: usize,
    zip_errors: usize,
    rejected: usize,
    keys: usize,
}

impl RunTracker {
    pub fn new(run_id: String) -> Self {
        RunTracker {
            run_id,
            ..Default::default()
        }
    }

    pub fn record_card(&mut self, is_email: bool) {
        self.rows += 1;
        self.records += 1;
        if is_email {
            self.emails += 1;
        } else {
            self.urls += 1;
        }
    }

    pub fn record_zip(&mut self, outcome: ZipOutcome) {
        match outcome {
            ZipOutcome::Found => self.zip_found += 1,
            ZipOutcome::Missing => self.zip_missing += 1,
            ZipOutcome::ParseError => self.zip_errors += 1,
        }
    }

    pub fn record_rejected(&mut self) {
        self.rows += 1;
        self.rejected += 1;
    }

    pub fn set_keys(&mut self, keys: usize) {
        self.keys = keys;
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn zip_errors(&self) -> usize {
        self.zip_errors
    }

    pub fn report(&self) {
        info!(
            run_id = %self.run_id,
            rows = self.rows,
            records = self.records,
            rejected = self.rejected,
            emails = self.emails,
            urls = self.urls,
            zip_found = self.zip_found,
            zip_missing = self.zip_missing,
            zip_errors = self.zip_errors,
            keys = self.keys,
            "run finished"
        );
        println!("  rows read:        {}", self.rows);
        println!(
            "  records built:    {} ({} email, {} url)",
            self.records, self.emails, self.urls
        );
        if self.rejected > 0 {
            println!("  rows rejected:    {}", self.rejected);
        }
        if self.zip_found + self.zip_missing + self.zip_errors > 0 {
            println!(
                "  zip codes:        {} found, {} missing, {} unparseable",
                self.zip_found, self.zip_missing, self.zip_errors
            );
            println!("  distinct keys:    {}", self.keys);
        }
    }
}

pub fn new_run_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("run-{}", now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_rows_and_outcomes() {
        let mut tracker = RunTracker::new("run-test".into());
        tracker.record_card(true);
        tracker.record_zip(ZipOutcome::Found);
        tracker.record_rejected();
        tracker.record_zip(ZipOutcome::ParseError);

        assert_eq!(tracker.run_id(), "run-test");
        assert_eq!(tracker.rows(), 2);
        assert_eq!(tracker.records(), 1);
        assert_eq!(tracker.rejected(), 1);
        assert_eq!(tracker.zip_errors(), 1);
    }

    #[test]
    fn run_ids_are_prefixed() {
        assert!(new_run_id().starts_with("run-"));
    }
}
