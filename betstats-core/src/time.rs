//! Date utilities for the `DD/MM/YYYY HH:MM` stamps the API returns.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::RecordError;

const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a transaction date like "09/04/2021 08:35".
///
/// A bare "09/04/2021" is accepted as midnight.
pub fn parse_transaction_date(raw: &str) -> Result<NaiveDateTime, RecordError> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| RecordError::InvalidDate(raw.to_string()))
}
