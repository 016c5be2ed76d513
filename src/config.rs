use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::address::tagger::DEFAULT_MAX_TOKENS;
use crate::aggregate::{RowErrorPolicy, DEFAULT_NO_ZIP_KEY};
use crate::output::TableFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input: PathBuf,
    pub has_header: bool,
    pub vcard_dir: PathBuf,
    pub zip_table: PathBuf,
    pub table_format: TableFormat,
    pub no_zip_key: String,
    pub on_row_error: RowErrorPolicy,
    pub max_address_tokens: usize,
}

/// Defaults, then `roster.toml` (or `path`), then `ROSTER_*` env vars.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    load_with_env(path, Environment::with_prefix("ROSTER"))
}

fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Settings> {
    let builder = Config::builder()
        .set_default("input", "senators.csv")?
        .set_default("has_header", true)?
        .set_default("vcard_dir", "vcards")?
        .set_default("zip_table", "reps.csv")?
        .set_default("table_format", "csv")?
        .set_default("no_zip_key", DEFAULT_NO_ZIP_KEY)?
        .set_default("on_row_error", "abort")?
        .set_default("max_address_tokens", DEFAULT_MAX_TOKENS as u64)?;

    let builder = match path {
        Some(p) => builder.add_source(File::from(p).required(true)),
        None => builder.add_source(File::with_name("roster").required(false)),
    };

    builder
        .add_source(env)
        .build()
        .context("Failed to load settings")?
        .try_deserialize()
        .context("Invalid settings")
}
