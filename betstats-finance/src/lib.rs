//! betstats-finance: classification of raw movements and per-period aggregation

pub mod aggregate;
pub mod classify;
pub mod transaction;

pub use aggregate::{
    AggregateBucket, OutcomeBucket, Period, UNBOUNDED_CAP, aggregate, aggregate_outcomes, balance,
    per_transaction,
};
pub use classify::{Classified, ClassificationError, classify, classify_all};
pub use transaction::{Category, Transaction};
