//! On-disk ledger for one account: a pretty-printed JSON array of raw records.

use anyhow::{Context, Result};
use betstats_core::{Ledger, RawTransactionRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/<login>.json`
    pub fn for_login(data_dir: &Path, login: &str) -> Self {
        let file = login.replace(['/', '\\'], "_");
        Self::new(data_dir.join(format!("{file}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty ledger.
    pub fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history yet");
            return Ok(Ledger::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let records: Vec<RawTransactionRecord> = serde_json::from_str(&s)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ledger::from_records(records).with_context(|| format!("load {}", self.path.display()))
    }

    /// Replace the file atomically: write a sibling temp file, then rename it over.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(ledger).context("serialize ledger")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), self.path.display()))?;

        debug!(path = %self.path.display(), records = ledger.len(), "history saved");
        Ok(())
    }
}
