//! Loading records and configurations from JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use linkage_batch::BatchMatchConfig;
use linkage_model::{MatchingConfig, Record};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read {what} file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {what} file {}", path.display()))
}

/// Load one record from a JSON object.
pub fn load_record(path: &Path) -> Result<Record> {
    read_json(path, "record")
}

/// Load a JSON array of records. Ids must be unique.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let records: Vec<Record> = read_json(path, "records")?;
    let mut seen = std::collections::HashSet::new();
    for record in &records {
        if !record.id.trim().is_empty() && !seen.insert(record.id.as_str()) {
            bail!("duplicate record id '{}' in {}", record.id, path.display());
        }
    }
    debug!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

/// Load a matching config, or fall back to a built-in preset.
///
/// Deserialization validates the config, so inverted thresholds or
/// administrative weight keys fail here with the file name attached.
pub fn load_matching_config(path: Option<&Path>, extended: bool) -> Result<MatchingConfig> {
    match path {
        Some(path) => read_json(path, "matching config"),
        None if extended => Ok(MatchingConfig::extended()),
        None => Ok(MatchingConfig::default()),
    }
}

pub fn load_batch_config(path: Option<&Path>) -> Result<BatchMatchConfig> {
    let config: BatchMatchConfig = match path {
        Some(path) => read_json(path, "batch config")?,
        None => BatchMatchConfig::default(),
    };
    config.validate().context("invalid batch config")?;
    Ok(config)
}

/// Write `value` as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}
