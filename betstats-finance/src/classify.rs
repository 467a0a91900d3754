//! Category rule table mapping raw records to normalized transactions.
//!
//! The API overloads its amount fields: `debitAmount` is a stake for bets but
//! a payout for withdrawals, `creditAmount` is a deposit or a win. Every code
//! gets exactly one extraction rule below.

use betstats_core::{RawTransactionRecord, RecordError, TransactionCode};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::transaction::{Category, Transaction};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("unknown transaction category '{code}' on {date}")]
    UnknownCategory { code: String, date: String },

    #[error(transparent)]
    Record(#[from] RecordError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Transaction(Transaction),
    /// Counted elsewhere (Boost duplicates its Win companion)
    Suppressed,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Deposit,
    Withdrawal,
    Bet,
}

enum Rule {
    Count {
        category: Category,
        slot: Slot,
        amount: fn(&RawTransactionRecord) -> Decimal,
    },
    Suppress,
}

fn debit(r: &RawTransactionRecord) -> Decimal {
    r.debit_amount.unwrap_or_default()
}

fn credit(r: &RawTransactionRecord) -> Decimal {
    r.credit_amount.unwrap_or_default()
}

fn stake(r: &RawTransactionRecord) -> Decimal {
    -debit(r)
}

fn winnings(r: &RawTransactionRecord) -> Decimal {
    r.total_amount.or(r.credit_amount).unwrap_or_default()
}

fn rule_for(code: &TransactionCode) -> Option<Rule> {
    use Rule::Count;
    let rule = match code {
        TransactionCode::Bet => Count {
            category: Category::Bet,
            slot: Slot::Bet,
            amount: stake,
        },
        TransactionCode::Win => Count {
            category: Category::Win,
            slot: Slot::Bet,
            amount: winnings,
        },
        TransactionCode::FreebetWin => Count {
            category: Category::FreebetWin,
            slot: Slot::Bet,
            amount: winnings,
        },
        TransactionCode::Deposit => Count {
            category: Category::Deposit,
            slot: Slot::Deposit,
            amount: credit,
        },
        TransactionCode::Withdrawal => Count {
            category: Category::Withdrawal,
            slot: Slot::Withdrawal,
            amount: debit,
        },
        TransactionCode::Boost => Rule::Suppress,
        TransactionCode::Other(_) => return None,
    };
    Some(rule)
}

pub fn classify(record: &RawTransactionRecord) -> Result<Classified, ClassificationError> {
    let Some(rule) = rule_for(&record.code) else {
        return Err(ClassificationError::UnknownCategory {
            code: record.code.to_string(),
            date: record.date.clone(),
        });
    };

    let Rule::Count {
        category,
        slot,
        amount,
    } = rule
    else {
        return Ok(Classified::Suppressed);
    };

    let value = amount(record);
    let mut txn = Transaction {
        date: record.date.clone(),
        timestamp: record.parsed_date()?,
        deposit: Decimal::ZERO,
        withdrawal: Decimal::ZERO,
        bet: Decimal::ZERO,
        category,
        reference: record.bet_reference.clone(),
    };
    match slot {
        Slot::Deposit => txn.deposit = value,
        Slot::Withdrawal => txn.withdrawal = value,
        Slot::Bet => txn.bet = value,
    }
    Ok(Classified::Transaction(txn))
}

/// Classify a whole ledger, dropping suppressed records.
///
/// Stops at the first unknown category: a partial money summary is worse than none.
pub fn classify_all<'a, I>(records: I) -> Result<Vec<Transaction>, ClassificationError>
where
    I: IntoIterator<Item = &'a RawTransactionRecord>,
{
    let mut out = Vec::new();
    for record in records {
        if let Classified::Transaction(txn) = classify(record)? {
            out.push(txn);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(record: RawTransactionRecord) -> Transaction {
        match classify(&record).unwrap() {
            Classified::Transaction(t) => t,
            Classified::Suppressed => panic!("unexpected suppression"),
        }
    }

    fn amounts(t: &Transaction) -> (Decimal, Decimal, Decimal) {
        (t.deposit, t.withdrawal, t.bet)
    }

    #[test]
    fn test_deposit_uses_credit() {
        let t = txn(
            RawTransactionRecord::new("01/01/2021 10:00", "Deposit").with_credit(dec!(100)),
        );
        assert_eq!(amounts(&t), (dec!(100), dec!(0), dec!(0)));
        assert_eq!(t.category, Category::Deposit);
    }

    #[test]
    fn test_withdrawal_uses_debit() {
        let t = txn(
            RawTransactionRecord::new("01/01/2021 10:00", "Withdrawal")
                .with_debit(dec!(40))
                .with_credit(dec!(999)),
        );
        assert_eq!(amounts(&t), (dec!(0), dec!(40), dec!(0)));
    }

    #[test]
    fn test_bet_is_negative_stake() {
        let t = txn(RawTransactionRecord::new("02/01/2021 10:00", "Bet").with_debit(dec!(50)));
        assert_eq!(amounts(&t), (dec!(0), dec!(0), dec!(-50)));
    }

    #[test]
    fn test_win_prefers_total_over_credit() {
        let t = txn(
            RawTransactionRecord::new("02/01/2021 11:00", "Win")
                .with_total(dec!(120))
                .with_credit(dec!(70)),
        );
        assert_eq!(t.bet, dec!(120));

        let t = txn(
            RawTransactionRecord::new("02/01/2021 11:00", "FreebetWin").with_credit(dec!(15)),
        );
        assert_eq!(t.bet, dec!(15));
        assert_eq!(t.category, Category::FreebetWin);
    }

    #[test]
    fn test_absent_amounts_default_to_zero() {
        for code in ["Bet", "Win", "FreebetWin", "Deposit", "Withdrawal"] {
            let t = txn(RawTransactionRecord::new("02/01/2021 11:00", code));
            assert_eq!(amounts(&t), (dec!(0), dec!(0), dec!(0)), "{code}");
        }
    }

    #[test]
    fn test_boost_is_always_suppressed() {
        let boosts = [
            RawTransactionRecord::new("02/01/2021 11:00", "Boost").with_total(dec!(120)),
            RawTransactionRecord::new("02/01/2021 11:00", "Boost").with_credit(dec!(5)),
            RawTransactionRecord::new("02/01/2021 11:00", "Boost").with_debit(dec!(5)),
            RawTransactionRecord::new("not a date", "Boost"),
        ];
        for b in &boosts {
            assert_eq!(classify(b).unwrap(), Classified::Suppressed);
        }
        assert!(classify_all(&boosts).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let rec = RawTransactionRecord::new("03/01/2021 09:00", "Unknown").with_credit(dec!(10));
        assert_eq!(
            classify(&rec),
            Err(ClassificationError::UnknownCategory {
                code: "Unknown".to_string(),
                date: "03/01/2021 09:00".to_string(),
            })
        );
    }

    #[test]
    fn test_classify_all_halts_on_unknown() {
        let records = vec![
            RawTransactionRecord::new("01/01/2021 10:00", "Deposit").with_credit(dec!(100)),
            RawTransactionRecord::new("02/01/2021 10:00", "Cashout").with_credit(dec!(1)),
            RawTransactionRecord::new("03/01/2021 10:00", "Bet").with_debit(dec!(5)),
        ];
        assert!(matches!(
            classify_all(&records),
            Err(ClassificationError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_exclusivity_across_codes() {
        let records = vec![
            RawTransactionRecord::new("01/01/2021 10:00", "Deposit")
                .with_credit(dec!(100))
                .with_debit(dec!(3))
                .with_total(dec!(8)),
            RawTransactionRecord::new("01/01/2021 11:00", "Bet")
                .with_debit(dec!(10))
                .with_credit(dec!(4))
                .with_total(dec!(9)),
            RawTransactionRecord::new("01/01/2021 12:00", "Win")
                .with_debit(dec!(2))
                .with_credit(dec!(4))
                .with_total(dec!(9)),
            RawTransactionRecord::new("01/01/2021 13:00", "Withdrawal")
                .with_debit(dec!(20))
                .with_credit(dec!(4))
                .with_total(dec!(9)),
        ];
        for t in classify_all(&records).unwrap() {
            let non_zero = [t.deposit, t.withdrawal, t.bet]
                .iter()
                .filter(|v| !v.is_zero())
                .count();
            assert!(non_zero <= 1, "{t:?}");
        }
    }
}
