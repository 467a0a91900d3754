//! Per-period totals feeding the balance chart.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::transaction::Transaction;

/// Upper bound for charts that list transactions one by one.
pub const UNBOUNDED_CAP: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBucket {
    pub label: String,
    pub deposit_sum: Decimal,
    pub withdrawal_sum: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Monthly,
    Yearly,
}

impl Period {
    /// `MM/YYYY` or `YYYY`
    pub fn label(&self, txn: &Transaction) -> String {
        match self {
            Period::Monthly => format!("{:02}/{}", txn.timestamp.month(), txn.timestamp.year()),
            Period::Yearly => format!("{}", txn.timestamp.year()),
        }
    }

    /// Maximum number of buckets displayed.
    pub fn cap(&self) -> usize {
        match self {
            Period::Monthly => 12,
            Period::Yearly => 4,
        }
    }
}

/// Label a transaction on its own, for the "new transactions" chart.
///
/// A stake and its winnings share the bet reference, and so one row.
pub fn per_transaction(txn: &Transaction) -> String {
    match &txn.reference {
        Some(reference) => reference.clone(),
        None => format!("{} {}", txn.date, txn.category.label()),
    }
}

/// Stakes and winnings of a group of bets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeBucket {
    pub label: String,
    /// Positive total of stakes
    pub staked: Decimal,
    pub won: Decimal,
}

/// Group by `bucket_of`, sum deposits and withdrawals, order buckets by the
/// period they cover and keep the first `cap`.
///
/// The earliest periods are kept when there are more than `cap`.
pub fn aggregate<F>(
    transactions: &[Transaction],
    bucket_of: F,
    cap: usize,
) -> Vec<AggregateBucket>
where
    F: Fn(&Transaction) -> String,
{
    group(
        transactions,
        bucket_of,
        cap,
        |label| AggregateBucket {
            label,
            deposit_sum: Decimal::ZERO,
            withdrawal_sum: Decimal::ZERO,
        },
        |bucket, txn| {
            bucket.deposit_sum += txn.deposit;
            bucket.withdrawal_sum += txn.withdrawal;
        },
    )
}

/// Same grouping as [`aggregate`], summing bet outcomes instead.
pub fn aggregate_outcomes<F>(
    transactions: &[Transaction],
    bucket_of: F,
    cap: usize,
) -> Vec<OutcomeBucket>
where
    F: Fn(&Transaction) -> String,
{
    group(
        transactions,
        bucket_of,
        cap,
        |label| OutcomeBucket {
            label,
            staked: Decimal::ZERO,
            won: Decimal::ZERO,
        },
        |bucket, txn| {
            if txn.bet.is_sign_negative() {
                bucket.staked -= txn.bet;
            } else {
                bucket.won += txn.bet;
            }
        },
    )
}

fn group<B, F, N, A>(
    transactions: &[Transaction],
    bucket_of: F,
    cap: usize,
    new: N,
    add: A,
) -> Vec<B>
where
    F: Fn(&Transaction) -> String,
    N: Fn(String) -> B,
    A: Fn(&mut B, &Transaction),
{
    let mut groups: HashMap<String, (NaiveDateTime, B)> = HashMap::new();

    for txn in transactions {
        let label = bucket_of(txn);
        let (first, bucket) = groups
            .entry(label.clone())
            .or_insert_with(|| (txn.timestamp, new(label)));
        *first = (*first).min(txn.timestamp);
        add(bucket, txn);
    }

    let mut buckets: Vec<_> = groups.into_iter().collect();
    buckets.sort_by(|(a_label, (a_first, _)), (b_label, (b_first, _))| {
        a_first.cmp(b_first).then_with(|| a_label.cmp(b_label))
    });
    buckets.into_iter().take(cap).map(|(_, (_, b))| b).collect()
}

/// Net outcome of all bets: winnings minus stakes.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|t| t.bet).sum()
}
