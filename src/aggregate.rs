use serde::Deserialize;
use std::collections::btree_map::{self, BTreeMap};
use tracing::{debug, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::address::{extract_postal_code, join_address_lines, AddressTagger};
use crate::builder::{build_record, build_record_with_street};
use crate::error::{AggregateError, RecordBuildError};
use crate::metrics::{RunTracker, ZipOutcome};
use crate::schema::Row;
use crate::vcard::ContactRecord;

pub const DEFAULT_NO_ZIP_KEY: &str = "unparseable";

/// What to do with a row that fails to build for a data reason. Schema
/// violations always abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZipKey {
    Code(String),
    Unparsed,
}

impl ZipKey {
    pub fn render<'a>(&'a self, no_zip_key: &'a str) -> &'a str {
        match self {
            ZipKey::Code(code) => code,
            ZipKey::Unparsed => no_zip_key,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipGroup {
    pub records: usize,
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipTable {
    groups: BTreeMap<ZipKey, ZipGroup>,
}

impl ZipTable {
    fn append(&mut self, key: ZipKey, text: &str) {
        let group = self.groups.entry(key).or_default();
        group.records += 1;
        group.payload.push_str(text);
    }

    pub fn get(&self, key: &ZipKey) -> Option<&ZipGroup> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ZipKey, ZipGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.groups.values().map(|g| g.records).sum()
    }

    /// `(key, record count, payload)` rows with the sentinel substituted.
    pub fn rows<'a>(&'a self, no_zip_key: &'a str) -> impl Iterator<Item = (&'a str, usize, &'a str)> {
        self.groups
            .iter()
            .map(move |(k, g)| (k.render(no_zip_key), g.records, g.payload.as_str()))
    }
}

/// One row after the map phase: serialized card plus its key.
#[derive(Debug)]
struct Prepared {
    line: usize,
    is_email: bool,
    key: ZipKey,
    outcome: ZipOutcome,
    text: String,
}

fn prepare(row: &Row, tagger: &dyn AddressTagger) -> Result<Prepared, RecordBuildError> {
    let record = build_record_with_street(row, join_address_lines(row)?)?;
    let address = record.street();
    let (key, outcome) = match extract_postal_code(tagger, address) {
        Ok(Some(code)) => (ZipKey::Code(code), ZipOutcome::Found),
        Ok(None) => {
            debug!(line = row.line(), address = %address, "no zip code found");
            (ZipKey::Unparsed, ZipOutcome::Missing)
        }
        Err(err) => {
            warn!(line = row.line(), error = %err, "address tagger failed");
            (ZipKey::Unparsed, ZipOutcome::ParseError)
        }
    };
    Ok(Prepared {
        line: row.line(),
        is_email: record.channel().is_email(),
        key,
        outcome,
        text: record.serialize(),
    })
}

/// Folds rows into a [`ZipTable`] in input order.
pub struct ZipAggregator<'t> {
    tagger: &'t dyn AddressTagger,
    policy: RowErrorPolicy,
    table: ZipTable,
    tracker: RunTracker,
}

impl<'t> ZipAggregator<'t> {
    pub fn new(tagger: &'t dyn AddressTagger, policy: RowErrorPolicy, run_id: String) -> Self {
        ZipAggregator {
            tagger,
            policy,
            table: ZipTable::default(),
            tracker: RunTracker::new(run_id),
        }
    }

    pub fn push(&mut self, row: &Row) -> Result<(), AggregateError> {
        let prepared = prepare(row, self.tagger);
        self.merge(prepared)
    }

    fn merge(&mut self, prepared: Result<Prepared, RecordBuildError>) -> Result<(), AggregateError> {
        match prepared {
            Ok(p) => {
                self.tracker.record_zip(p.outcome);
                self.tracker.record_card(p.is_email);
                debug!(line = p.line, key = ?p.key, "appending card");
                self.table.append(p.key, &p.text);
                Ok(())
            }
            Err(err) => reject(&mut self.tracker, self.policy, err),
        }
    }

    pub fn finish(mut self) -> (ZipTable, RunTracker) {
        self.tracker.set_keys(self.table.len());
        (self.table, self.tracker)
    }
}

fn reject(
    tracker: &mut RunTracker,
    policy: RowErrorPolicy,
    err: RecordBuildError,
) -> Result<(), AggregateError> {
    if err.is_schema() || policy == RowErrorPolicy::Abort {
        return Err(err.into());
    }
    warn!(error = %err, "skipping row");
    tracker.record_rejected();
    Ok(())
}

#[cfg(feature = "rayon")]
fn prepare_all(rows: &[Row], tagger: &dyn AddressTagger) -> Vec<Result<Prepared, RecordBuildError>> {
    rows.par_iter().map(|row| prepare(row, tagger)).collect()
}

#[cfg(not(feature = "rayon"))]
fn prepare_all(rows: &[Row], tagger: &dyn AddressTagger) -> Vec<Result<Prepared, RecordBuildError>> {
    rows.iter().map(|row| prepare(row, tagger)).collect()
}

/// Whole-batch fold. The map phase may run in parallel; the merge is
/// sequential and keeps input order within each key.
pub fn aggregate_rows(
    rows: &[Row],
    tagger: &dyn AddressTagger,
    policy: RowErrorPolicy,
    run_id: String,
) -> Result<(ZipTable, RunTracker), AggregateError> {
    let mut aggregator = ZipAggregator::new(tagger, policy, run_id);
    for prepared in prepare_all(rows, tagger) {
        aggregator.merge(prepared)?;
    }
    Ok(aggregator.finish())
}

/// Builds every row's card for per-person output.
pub fn build_records(
    rows: &[Row],
    policy: RowErrorPolicy,
    tracker: &mut RunTracker,
) -> Result<Vec<ContactRecord>, AggregateError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match build_record(row) {
            Ok(record) => {
                tracker.record_card(record.channel().is_email());
                records.push(record);
            }
            Err(err) => reject(tracker, policy, err)?,
        }
    }
    Ok(records)
}
