//! `--add`: interactive helper appending an account to `accounts.toml`.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::info;

use crate::config::{Account, load_accounts, save_accounts};

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
    write!(out, "{}: ", label)?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        bail!("input closed while reading {}", label);
    }
    Ok(s.trim().to_string())
}

fn prompt_non_empty<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<String> {
    loop {
        let s = prompt(input, out, label)?;
        if !s.is_empty() {
            return Ok(s);
        }
        writeln!(out, "  (required)")?;
    }
}

fn prompt_birthday<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    loop {
        let s = prompt(input, out, "Birthday (YYYY-MM-DD)")?;
        match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => return Ok(d.format("%Y-%m-%d").to_string()),
            Err(_) => writeln!(out, "  '{}' is not a YYYY-MM-DD date", s)?,
        }
    }
}

pub fn run_add(accounts_path: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    add_account(&mut input, &mut out, accounts_path)
}

pub(crate) fn add_account<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    accounts_path: &Path,
) -> Result<()> {
    writeln!(out, "Add a Betclic account\n")?;
    let mut file = load_accounts(accounts_path)?;

    let name = loop {
        let name = prompt_non_empty(input, out, "Account name")?;
        if file.accounts.iter().any(|a| a.name == name) {
            writeln!(out, "  an account named '{}' already exists", name)?;
            continue;
        }
        break name;
    };
    let birthday = prompt_birthday(input, out)?;
    let login = prompt_non_empty(input, out, "Login (email or user id)")?;
    let password = prompt_non_empty(input, out, "Password")?;

    file.accounts
        .push(Account::from_plaintext(&name, &birthday, &login, &password));
    save_accounts(accounts_path, &file)
        .with_context(|| format!("saving account '{}'", name))?;

    info!(account = %name, "account added");
    writeln!(out, "\nSaved account '{}' to {}", name, accounts_path.display())?;
    writeln!(out, "Run `betstats` to fetch its history.")?;
    Ok(())
}
