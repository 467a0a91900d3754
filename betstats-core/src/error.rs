//! Errors raised while validating and ordering raw records.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid transaction date '{0}' (expected DD/MM/YYYY HH:MM)")]
    InvalidDate(String),

    #[error("negative {field} ({amount}) on transaction dated {date}")]
    NegativeAmount {
        field: &'static str,
        amount: Decimal,
        date: String,
    },
}
