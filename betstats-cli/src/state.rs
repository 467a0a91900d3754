use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$BETSTATS_HOME`, or `~/.betstats`.
pub fn betstats_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BETSTATS_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".betstats"))
}

pub fn ensure_betstats_home() -> Result<PathBuf> {
    let dir = betstats_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn accounts_path() -> Result<PathBuf> {
    Ok(ensure_betstats_home()?.join("accounts.toml"))
}

/// Directory holding one `<login>.json` ledger per account.
pub fn data_dir() -> Result<PathBuf> {
    Ok(ensure_betstats_home()?.join("data"))
}
