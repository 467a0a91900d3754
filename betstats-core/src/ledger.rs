//! Persisted transaction ledger and the merge that folds new fetches into it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::RecordError;
use crate::record::RawTransactionRecord;

/// Deduplicated raw records of one account, ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    records: Vec<RawTransactionRecord>,
}

/// Result of a merge: the new ledger plus the records it did not know yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub ledger: Ledger,
    /// Newly seen records, in ledger order
    pub added: Vec<RawTransactionRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from arbitrary records, enforcing the ledger invariants.
    pub fn from_records(records: Vec<RawTransactionRecord>) -> Result<Self, RecordError> {
        Ok(merge(Ledger::new(), records)?.ledger)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawTransactionRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[RawTransactionRecord] {
        &self.records
    }

    /// Timestamp of the most recent entry; the fetcher stops paging once it
    /// reaches records at or before this point.
    pub fn latest(&self) -> Result<Option<NaiveDateTime>, RecordError> {
        self.records.last().map(|r| r.parsed_date()).transpose()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a RawTransactionRecord;
    type IntoIter = std::slice::Iter<'a, RawTransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Union `existing` and `incoming` by structural equality, then stable-sort
/// ascending by parsed date.
///
/// Existing entries keep precedence over incoming duplicates, so ties on the
/// timestamp resolve to first-seen order. Incoming pages may arrive in any
/// order and may repeat history already in the ledger.
pub fn merge(
    existing: Ledger,
    incoming: Vec<RawTransactionRecord>,
) -> Result<MergeOutcome, RecordError> {
    let mut seen: HashSet<RawTransactionRecord> = existing.records.iter().cloned().collect();
    let mut fresh = HashSet::new();
    let mut records = existing.records;

    for record in incoming {
        if seen.contains(&record) {
            continue;
        }
        seen.insert(record.clone());
        fresh.insert(record.clone());
        records.push(record);
    }

    let mut keyed = records
        .into_iter()
        .map(|r| r.parsed_date().map(|d| (d, r)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by_key(|(date, _)| *date);

    let records: Vec<_> = keyed.into_iter().map(|(_, r)| r).collect();
    let ledger = Ledger { records };
    let added = ledger
        .iter()
        .filter(|r| fresh.contains(*r))
        .cloned()
        .collect();

    Ok(MergeOutcome { ledger, added })
}
