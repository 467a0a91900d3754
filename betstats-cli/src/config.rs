//! Account list stored in `accounts.toml`.
//!
//! Birthday, login and password are base64-encoded on disk so they are not
//! readable at a glance. This is obfuscation, not encryption.

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use betstats_ingest::RequestContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountsFile {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub birthday: String,
    pub login: String,
    pub password: String,
}

fn default_enabled() -> bool {
    true
}

impl Account {
    /// Build an account from plaintext credentials, encoding them for storage.
    pub fn from_plaintext(name: &str, birthday: &str, login: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            birthday: encode(birthday),
            login: encode(login),
            password: encode(password),
        }
    }

    pub fn credentials(&self) -> Result<RequestContext> {
        Ok(RequestContext::new(
            decode(&self.birthday).with_context(|| format!("decode birthday of '{}'", self.name))?,
            decode(&self.login).with_context(|| format!("decode login of '{}'", self.name))?,
            decode(&self.password).with_context(|| format!("decode password of '{}'", self.name))?,
        ))
    }
}

pub fn encode(plain: &str) -> String {
    BASE64.encode(plain.as_bytes())
}

pub fn decode(encoded: &str) -> Result<String> {
    let bytes = BASE64.decode(encoded.trim()).context("invalid base64")?;
    String::from_utf8(bytes).context("decoded value is not UTF-8")
}

/// A missing file is an empty account list.
pub fn load_accounts(path: &Path) -> Result<AccountsFile> {
    if !path.exists() {
        return Ok(AccountsFile::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_accounts(path: &Path, file: &AccountsFile) -> Result<()> {
    let s = toml::to_string_pretty(file).context("serialize accounts")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
