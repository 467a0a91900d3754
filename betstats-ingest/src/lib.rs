//! betstats-ingest: Betclic API fetcher and the per-account history file.

pub mod betclic;
pub mod error;
pub mod history;
pub mod types;

pub use betclic::{BetclicClient, TransactionSource};
pub use error::IngestError;
pub use history::HistoryStore;
pub use types::{AuthenticatedSession, RequestContext};
