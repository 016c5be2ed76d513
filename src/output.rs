use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::aggregate::ZipTable;
use crate::vcard::ContactRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Sqlite,
    Json,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Sqlite => "sqlite",
            TableFormat::Json => "json",
        }
    }
}

/// `<first>_<last>.vcf`, with path separators replaced.
pub fn vcard_file_name(record: &ContactRecord) -> String {
    format!("{}_{}.vcf", record.given_name(), record.family_name()).replace(['/', '\\'], "-")
}

pub fn write_vcards(dir: &Path, records: &[ContactRecord]) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    for record in records {
        let path = dir.join(vcard_file_name(record));
        fs::write(&path, record.serialize())
            .with_context(|| format!("Failed to write {:?}", path))?;
        debug!(path = ?path, "wrote vcard");
    }
    Ok(records.len())
}

pub fn write_zip_table(
    format: TableFormat,
    path: &Path,
    table: &ZipTable,
    no_zip_key: &str,
) -> Result<()> {
    match format {
        TableFormat::Csv => write_zip_csv(path, table, no_zip_key),
        TableFormat::Sqlite => write_zip_sqlite(path, table, no_zip_key),
        TableFormat::Json => write_zip_json(path, table, no_zip_key),
    }
}

/// Two columns, no header: zip code, concatenated cards.
fn write_zip_csv(path: &Path, table: &ZipTable, no_zip_key: &str) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for (key, _, payload) in table.rows(no_zip_key) {
        writer.write_record([key, payload])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_zip_sqlite(path: &Path, table: &ZipTable, no_zip_key: &str) -> Result<()> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reps_by_zip (
            zip_code TEXT PRIMARY KEY,
            record_count INTEGER NOT NULL,
            vcards TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute("BEGIN TRANSACTION", [])?;
    conn.execute("DELETE FROM reps_by_zip", [])?;
    {
        let mut stmt = conn.prepare(
            "INSERT OR REPLACE INTO reps_by_zip (zip_code, record_count, vcards) VALUES (?1, ?2, ?3)",
        )?;
        for (key, count, payload) in table.rows(no_zip_key) {
            stmt.execute(params![key, count as i64, payload])?;
        }
    }
    conn.execute("COMMIT", [])?;
    Ok(())
}

fn write_zip_json(path: &Path, table: &ZipTable, no_zip_key: &str) -> Result<()> {
    let map: serde_json::Map<String, serde_json::Value> = table
        .rows(no_zip_key)
        .map(|(key, _, payload)| (key.to_string(), serde_json::Value::from(payload)))
        .collect();
    let text = serde_json::to_string_pretty(&map)?;
    fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
