//! Normalized view of a raw record: deposit, withdrawal or net bet outcome.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "bet")]
    Bet,
    #[serde(rename = "win")]
    Win,
    #[serde(rename = "freebet-win")]
    FreebetWin,
    #[serde(rename = "deposit")]
    Deposit,
    #[serde(rename = "withdrawal")]
    Withdrawal,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Bet => "bet",
            Category::Win => "win",
            Category::FreebetWin => "freebet-win",
            Category::Deposit => "deposit",
            Category::Withdrawal => "withdrawal",
        }
    }
}

/// Derived on every run from the ledger, never persisted.
///
/// At most one of `deposit`, `withdrawal` and `bet` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Raw "DD/MM/YYYY HH:MM" stamp
    pub date: String,
    pub timestamp: NaiveDateTime,
    pub deposit: Decimal,
    pub withdrawal: Decimal,
    /// Negative for stakes, positive for winnings
    pub bet: Decimal,
    pub category: Category,
    pub reference: Option<String>,
}

impl Transaction {
    pub fn is_bet_outcome(&self) -> bool {
        !self.bet.is_zero()
    }
}
