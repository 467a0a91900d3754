//! Per-account pipeline: load ledger, fetch, merge, classify, save, chart.
//!
//! Nothing is written to disk until the merged ledger classifies cleanly.
//! A classification failure halts the whole run; any other failure only
//! skips the account it happened on.

use anyhow::{Context, Result};
use betstats_core::merge;
use betstats_finance::{
    ClassificationError, Period, Transaction, UNBOUNDED_CAP, aggregate, aggregate_outcomes,
    balance, classify_all, per_transaction,
};
use betstats_ingest::{HistoryStore, RequestContext, TransactionSource};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use tracing::{error, info, warn};

use crate::chart::{self, GLOBAL_STYLE, NEW_BETS_STYLE, Row};
use crate::config::Account;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Fetch from the API before charting
    pub update: bool,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub ledger_len: usize,
    pub added: usize,
    pub transactions: usize,
    pub balance: Decimal,
    pub saved: bool,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub processed: Vec<String>,
    pub failed: Vec<String>,
}

pub async fn run_account<S, W>(
    source: &S,
    store: &HistoryStore,
    ctx: &RequestContext,
    title: &str,
    opts: RunOptions,
    out: &mut W,
) -> Result<AccountSummary>
where
    S: TransactionSource + ?Sized,
    W: Write,
{
    let ledger = store.load()?;

    let fetched = if opts.update {
        let until = ledger.latest()?;
        source
            .fetch_since(ctx, until)
            .await
            .with_context(|| format!("fetching transactions for {}", ctx.login))?
    } else {
        Vec::new()
    };

    let outcome = merge(ledger, fetched)?;
    let transactions = classify_all(&outcome.ledger)?;

    let saved = !outcome.added.is_empty();
    if saved {
        store.save(&outcome.ledger)?;
        info!(path = %store.path().display(), added = outcome.added.len(), "ledger updated");
    }

    let new_bets: Vec<Transaction> = classify_all(&outcome.added)?
        .into_iter()
        .filter(Transaction::is_bet_outcome)
        .collect();
    if !new_bets.is_empty() {
        let rows: Vec<Row> = aggregate_outcomes(&new_bets, per_transaction, UNBOUNDED_CAP)
            .iter()
            .map(Row::from)
            .collect();
        chart::render(
            out,
            &format!("New bets: {title}"),
            balance(&new_bets),
            &NEW_BETS_STYLE,
            &rows,
        )?;
    }

    let total = balance(&transactions);
    if transactions.is_empty() {
        info!(account = %title, "no transactions to chart");
    } else {
        let period = opts.period;
        let rows: Vec<Row> = aggregate(&transactions, |t| period.label(t), period.cap())
            .iter()
            .map(Row::from)
            .collect();
        chart::render(
            out,
            &format!("Global statistics: {title}"),
            total,
            &GLOBAL_STYLE,
            &rows,
        )?;
    }

    Ok(AccountSummary {
        ledger_len: outcome.ledger.len(),
        added: outcome.added.len(),
        transactions: transactions.len(),
        balance: total,
        saved,
    })
}

/// Process enabled accounts one after the other.
///
/// Returns an error only when classification fails, which stops the run.
pub async fn run_all<S, W>(
    source: &S,
    accounts: &[Account],
    only: Option<&str>,
    data_dir: &Path,
    opts: RunOptions,
    out: &mut W,
) -> Result<RunReport>
where
    S: TransactionSource + ?Sized,
    W: Write,
{
    let mut report = RunReport::default();

    for account in accounts {
        if only.is_some_and(|name| name != account.name) {
            continue;
        }
        if !account.enabled {
            info!(account = %account.name, "skipping disabled account");
            continue;
        }

        let result = match account.credentials() {
            Ok(ctx) => {
                let store = HistoryStore::for_login(data_dir, &ctx.login);
                run_account(source, &store, &ctx, &account.name, opts, out).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                info!(
                    account = %account.name,
                    ledger = summary.ledger_len,
                    added = summary.added,
                    transactions = summary.transactions,
                    saved = summary.saved,
                    balance = %summary.balance,
                    "account processed"
                );
                report.processed.push(account.name.clone());
            }
            Err(e) if e.downcast_ref::<ClassificationError>().is_some() => {
                error!(account = %account.name, "{e:#}");
                return Err(e.context(format!("account '{}'", account.name)));
            }
            Err(e) => {
                error!(account = %account.name, "{e:#}");
                report.failed.push(account.name.clone());
            }
        }
    }

    if let Some(name) = only {
        if report.processed.is_empty() && report.failed.is_empty() {
            warn!(account = %name, "no enabled account with this name");
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use betstats_core::{Ledger, RawTransactionRecord, parse_transaction_date};
    use betstats_ingest::IngestError;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;

    /// Serves canned records per login; `None` simulates a rejected login.
    #[derive(Default)]
    struct MockSource {
        responses: HashMap<String, Option<Vec<RawTransactionRecord>>>,
        calls: Mutex<Vec<(String, Option<NaiveDateTime>)>>,
    }

    impl MockSource {
        fn with(mut self, login: &str, records: Option<Vec<RawTransactionRecord>>) -> Self {
            self.responses.insert(login.to_string(), records);
            self
        }

        fn calls(&self) -> Vec<(String, Option<NaiveDateTime>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransactionSource for MockSource {
        async fn fetch_since(
            &self,
            ctx: &RequestContext,
            until: Option<NaiveDateTime>,
        ) -> Result<Vec<RawTransactionRecord>, IngestError> {
            self.calls.lock().unwrap().push((ctx.login.clone(), until));
            match self.responses.get(&ctx.login) {
                Some(Some(records)) => Ok(records.clone()),
                _ => Err(IngestError::AuthRejected("Blocked".to_string())),
            }
        }
    }

    fn monthly(update: bool) -> RunOptions {
        RunOptions {
            update,
            period: Period::Monthly,
        }
    }

    fn ctx(login: &str) -> RequestContext {
        RequestContext::new("1990-01-31", login, "pw")
    }

    fn seeded_store(dir: &Path, login: &str) -> HistoryStore {
        let store = HistoryStore::for_login(dir, login);
        let ledger = Ledger::from_records(vec![
            RawTransactionRecord::new("01/01/2021 10:00", "Deposit").with_credit(dec!(100)),
        ])
        .unwrap();
        store.save(&ledger).unwrap();
        store
    }

    #[tokio::test]
    async fn test_fetch_merge_save_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path(), "jdoe");
        let source = MockSource::default().with(
            "jdoe",
            Some(vec![
                RawTransactionRecord::new("02/01/2021 11:00", "Boost").with_total(dec!(120)),
                RawTransactionRecord::new("02/01/2021 11:00", "Win").with_total(dec!(120)),
                RawTransactionRecord::new("02/01/2021 10:00", "Bet").with_debit(dec!(50)),
            ]),
        );

        let mut out = Vec::new();
        let summary = run_account(
            &source,
            &store,
            &ctx("jdoe"),
            "main",
            monthly(true),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            AccountSummary {
                ledger_len: 4,
                added: 3,
                transactions: 3,
                balance: dec!(70),
                saved: true,
            }
        );
        assert_eq!(store.load().unwrap().len(), 4);
        assert_eq!(
            source.calls(),
            vec![(
                "jdoe".to_string(),
                Some(parse_transaction_date("01/01/2021 10:00").unwrap())
            )]
        );

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("New bets: main"));
        assert!(text.contains("Global statistics: main"));
        assert!(text.contains("+70.00 €"));
    }

    #[tokio::test]
    async fn test_unknown_category_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path(), "jdoe");
        let before = fs::read(store.path()).unwrap();
        let source = MockSource::default().with(
            "jdoe",
            Some(vec![
                RawTransactionRecord::new("05/01/2021 10:00", "Unknown").with_credit(dec!(9)),
            ]),
        );

        let err = run_account(
            &source,
            &store,
            &ctx("jdoe"),
            "main",
            monthly(true),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(err.downcast_ref::<ClassificationError>().is_some());
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_no_update_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path(), "jdoe");
        let source = MockSource::default();

        let mut out = Vec::new();
        let summary = run_account(
            &source,
            &store,
            &ctx("jdoe"),
            "main",
            monthly(false),
            &mut out,
        )
        .await
        .unwrap();

        assert!(source.calls().is_empty());
        assert!(!summary.saved);
        assert_eq!(summary.transactions, 1);
        assert!(!String::from_utf8(out).unwrap().contains("New bets"));
    }

    #[tokio::test]
    async fn test_empty_history_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::for_login(dir.path(), "fresh");
        let source = MockSource::default().with("fresh", Some(Vec::new()));

        let mut out = Vec::new();
        let summary = run_account(
            &source,
            &store,
            &ctx("fresh"),
            "fresh",
            monthly(true),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(summary.transactions, 0);
        assert!(out.is_empty());
        assert!(!store.path().exists());
        assert_eq!(source.calls(), vec![("fresh".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_account_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let broken_store = seeded_store(dir.path(), "broken");
        let before = fs::read(broken_store.path()).unwrap();

        let accounts = vec![
            Account::from_plaintext("first", "1990-01-31", "broken", "pw"),
            Account::from_plaintext("second", "1990-01-31", "ok", "pw"),
        ];
        let source = MockSource::default().with(
            "ok",
            Some(vec![
                RawTransactionRecord::new("01/02/2021 10:00", "Deposit").with_credit(dec!(5)),
            ]),
        );

        let report = run_all(
            &source,
            &accounts,
            None,
            dir.path(),
            monthly(true),
            &mut Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.failed, vec!["first"]);
        assert_eq!(report.processed, vec!["second"]);
        assert_eq!(fs::read(broken_store.path()).unwrap(), before);
        assert!(HistoryStore::for_login(dir.path(), "ok").path().exists());
    }

    #[tokio::test]
    async fn test_classification_error_halts_run() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = vec![
            Account::from_plaintext("first", "1990-01-31", "weird", "pw"),
            Account::from_plaintext("second", "1990-01-31", "ok", "pw"),
        ];
        let source = MockSource::default()
            .with(
                "weird",
                Some(vec![RawTransactionRecord::new("01/02/2021 10:00", "Lottery")]),
            )
            .with("ok", Some(Vec::new()));

        let err = run_all(
            &source,
            &accounts,
            None,
            dir.path(),
            monthly(true),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(err.downcast_ref::<ClassificationError>().is_some());
        let logins: Vec<_> = source.calls().into_iter().map(|(l, _)| l).collect();
        assert_eq!(logins, vec!["weird"]);
        assert!(!HistoryStore::for_login(dir.path(), "weird").path().exists());
    }

    #[tokio::test]
    async fn test_disabled_and_unselected_accounts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut off = Account::from_plaintext("off", "1990-01-31", "a", "pw");
        off.enabled = false;
        let accounts = vec![
            off,
            Account::from_plaintext("other", "1990-01-31", "b", "pw"),
            Account::from_plaintext("picked", "1990-01-31", "c", "pw"),
        ];
        let source = MockSource::default().with("c", Some(Vec::new()));

        let report = run_all(
            &source,
            &accounts,
            Some("picked"),
            dir.path(),
            monthly(true),
            &mut Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.processed, vec!["picked"]);
        assert_eq!(source.calls().len(), 1);
    }
}
