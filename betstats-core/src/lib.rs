//! betstats-core: raw transaction records, the account ledger and its merge

pub mod error;
pub mod ledger;
pub mod record;
pub mod time;

pub use error::RecordError;
pub use ledger::{Ledger, MergeOutcome, merge};
pub use record::{RawTransactionRecord, TransactionCode};
pub use time::parse_transaction_date;
