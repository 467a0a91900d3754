//! Terminal bar chart for aggregated buckets.

use betstats_finance::{AggregateBucket, OutcomeBucket};
use crossterm::style::{Color, Stylize};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io::{self, Write};

const WIDTH: usize = 50;
const TICK: char = '▇';

/// One chart line: a label with two values drawn as two bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: String,
    pub values: [Decimal; 2],
}

impl From<&AggregateBucket> for Row {
    fn from(b: &AggregateBucket) -> Self {
        Row {
            label: b.label.clone(),
            values: [b.deposit_sum, b.withdrawal_sum],
        }
    }
}

impl From<&OutcomeBucket> for Row {
    fn from(b: &OutcomeBucket) -> Self {
        Row {
            label: b.label.clone(),
            values: [b.staked, b.won],
        }
    }
}

pub struct ChartStyle {
    pub legend: [&'static str; 2],
    pub colors: [Color; 2],
}

pub const GLOBAL_STYLE: ChartStyle = ChartStyle {
    legend: ["Deposits", "Withdrawals"],
    colors: [Color::Red, Color::Blue],
};

pub const NEW_BETS_STYLE: ChartStyle = ChartStyle {
    legend: ["Stakes", "Winnings"],
    colors: [Color::Black, Color::Green],
};

/// Human readable amount: "157.36 k€", "-4.10 €".
pub fn fmt_number(val: Decimal, suffix: &str) -> String {
    let divider = Decimal::from(1000);
    let mut val = val;
    for unit in ["", "k", "M", "G", "T", "P", "E", "Z"] {
        if val.abs() < divider {
            return format!("{:.2} {}{}", val, unit, suffix);
        }
        val /= divider;
    }
    format!("{:.2} Y{}", val, suffix)
}

/// Signed headline balance, "+" prefixed when positive.
pub fn headline(balance: Decimal) -> String {
    let sign = if balance > Decimal::ZERO { "+" } else { "" };
    format!("{}{}", sign, fmt_number(balance, "€"))
}

pub fn render<W: Write>(
    out: &mut W,
    title: &str,
    balance: Decimal,
    style: &ChartStyle,
    rows: &[Row],
) -> io::Result<()> {
    let headline = headline(balance);
    let headline = if balance > Decimal::ZERO {
        headline.green()
    } else if balance < Decimal::ZERO {
        headline.red()
    } else {
        headline.stylize()
    };
    writeln!(out, "\n# {} ({})\n", title.bold(), headline)?;

    writeln!(
        out,
        "{}  {}\n",
        format!("{} {}", TICK, style.legend[0]).with(style.colors[0]),
        format!("{} {}", TICK, style.legend[1]).with(style.colors[1]),
    )?;

    let max = rows
        .iter()
        .flat_map(|r| r.values.iter())
        .filter_map(|v| v.to_f64())
        .fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);

    for row in rows {
        for (i, value) in row.values.iter().enumerate() {
            let label = if i == 0 { row.label.as_str() } else { "" };
            let bar: String = std::iter::repeat_n(TICK, bar_len(*value, max)).collect();
            writeln!(
                out,
                "{:>width$}: {} {:.2}",
                label,
                bar.with(style.colors[i]),
                value,
                width = label_width
            )?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn bar_len(value: Decimal, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    let v = value.to_f64().unwrap_or(0.0).max(0.0);
    ((v / max) * WIDTH as f64).round() as usize
}
