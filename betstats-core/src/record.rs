//! Raw transaction records as returned by the betting API

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RecordError;
use crate::time::parse_transaction_date;

/// Category tag carried in the `code` field.
///
/// Unrecognized tags are kept verbatim so classification can reject them
/// instead of the record silently disappearing at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionCode {
    Bet,
    Win,
    FreebetWin,
    Deposit,
    Withdrawal,
    Boost,
    Other(String),
}

impl TransactionCode {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionCode::Bet => "Bet",
            TransactionCode::Win => "Win",
            TransactionCode::FreebetWin => "FreebetWin",
            TransactionCode::Deposit => "Deposit",
            TransactionCode::Withdrawal => "Withdrawal",
            TransactionCode::Boost => "Boost",
            TransactionCode::Other(code) => code,
        }
    }
}

impl From<String> for TransactionCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "Bet" => TransactionCode::Bet,
            "Win" => TransactionCode::Win,
            "FreebetWin" => TransactionCode::FreebetWin,
            "Deposit" => TransactionCode::Deposit,
            "Withdrawal" => TransactionCode::Withdrawal,
            "Boost" => TransactionCode::Boost,
            _ => TransactionCode::Other(code),
        }
    }
}

impl From<&str> for TransactionCode {
    fn from(code: &str) -> Self {
        TransactionCode::from(code.to_string())
    }
}

impl From<TransactionCode> for String {
    fn from(code: TransactionCode) -> Self {
        match code {
            TransactionCode::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One movement on the betting account, exactly as fetched.
///
/// Identity is structural: two records with identical fields are the same
/// movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRecord {
    /// "DD/MM/YYYY HH:MM"
    pub date: String,
    pub code: TransactionCode,
    #[serde(default)]
    pub debit_amount: Option<Decimal>,
    #[serde(default)]
    pub credit_amount: Option<Decimal>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    /// Set by the API on bet movements, absent on credits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_reference: Option<String>,
}

impl RawTransactionRecord {
    pub fn new(date: impl Into<String>, code: impl Into<TransactionCode>) -> Self {
        Self {
            date: date.into(),
            code: code.into(),
            debit_amount: None,
            credit_amount: None,
            total_amount: None,
            bet_reference: None,
        }
    }

    pub fn with_debit(mut self, amount: Decimal) -> Self {
        self.debit_amount = Some(amount);
        self
    }

    pub fn with_credit(mut self, amount: Decimal) -> Self {
        self.credit_amount = Some(amount);
        self
    }

    pub fn with_total(mut self, amount: Decimal) -> Self {
        self.total_amount = Some(amount);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.bet_reference = Some(reference.into());
        self
    }

    pub fn parsed_date(&self) -> Result<NaiveDateTime, RecordError> {
        parse_transaction_date(&self.date)
    }

    /// Ingestion-boundary check: the date must parse and no amount may be negative.
    pub fn validate(&self) -> Result<(), RecordError> {
        self.parsed_date()?;
        for (field, amount) in [
            ("debitAmount", self.debit_amount),
            ("creditAmount", self.credit_amount),
            ("totalAmount", self.total_amount),
        ] {
            if let Some(amount) = amount {
                if amount.is_sign_negative() && !amount.is_zero() {
                    return Err(RecordError::NegativeAmount {
                        field,
                        amount,
                        date: self.date.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
