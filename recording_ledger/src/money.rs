//! Integer-cents money arithmetic.
//!
//! Every monetary value in the ledger is a whole number of cents. This module
//! holds the earnings rate, the decimal-string parser used for withdrawal
//! amounts, and the fixed two-decimal formatter used for balance display.

use crate::ledger::errors::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};

/// Money in cents
pub type Cents = i64;

/// Cents earned per hour of recording (one dollar)
pub const CENTS_PER_DOLLAR: Cents = 100;

/// Minutes in one billed hour
pub const MINUTES_PER_HOUR: i64 = 60;

/// Compute earnings for a recording interval.
///
/// Pays one dollar per hour, pro-rated to the whole minute and floored to
/// whole cents. Sub-minute durations earn nothing.
///
/// # Errors
///
/// * `LedgerError::InvalidRange` - `end` is not strictly after `start`
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use recording_ledger::money::earnings;
///
/// let start = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();
/// assert_eq!(earnings(start, start + Duration::minutes(90)).unwrap(), 150);
/// assert_eq!(earnings(start, start + Duration::seconds(59)).unwrap(), 0);
/// ```
pub fn earnings(start: DateTime<Utc>, end: DateTime<Utc>) -> LedgerResult<Cents> {
    if end <= start {
        return Err(LedgerError::InvalidRange { start, end });
    }

    let minutes = (end - start).num_minutes();
    Ok(minutes * CENTS_PER_DOLLAR / MINUTES_PER_HOUR)
}

/// Parse a decimal dollar amount into cents.
///
/// Accepts `"3.25"`, `"1."`, `".50"` and `"7"`. The fractional part is
/// right-padded or truncated (never rounded) to two digits.
///
/// # Errors
///
/// * `LedgerError::InvalidAmount` - empty input, more than one decimal point,
///   any non-digit character, or a value that does not fit in `i64` cents
pub fn parse_cents(input: &str) -> LedgerResult<Cents> {
    if input.is_empty() {
        return Err(LedgerError::InvalidAmount("empty amount".to_string()));
    }

    let mut parts = input.splitn(3, '.');
    let dollars_part = parts.next().unwrap_or_default();
    let fraction_part = parts.next();
    if parts.next().is_some() {
        return Err(LedgerError::InvalidAmount(format!(
            "too many decimal points in {input:?}"
        )));
    }

    let dollars = if dollars_part.is_empty() {
        0
    } else {
        parse_digits(dollars_part, input)?
    };

    let cents = match fraction_part {
        None | Some("") => 0,
        Some(fraction) => {
            // Validate the whole fraction before truncating it
            parse_digits(fraction, input)?;
            let mut two_digits: String = fraction.chars().take(2).collect();
            if two_digits.len() == 1 {
                two_digits.push('0');
            }
            parse_digits(&two_digits, input)?
        }
    };

    dollars
        .checked_mul(CENTS_PER_DOLLAR)
        .and_then(|c| c.checked_add(cents))
        .ok_or_else(|| LedgerError::InvalidAmount(format!("amount {input:?} is too large")))
}

fn parse_digits(digits: &str, input: &str) -> LedgerResult<Cents> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidAmount(format!(
            "non-digit characters in {input:?}"
        )));
    }
    digits
        .parse()
        .map_err(|_| LedgerError::InvalidAmount(format!("amount {input:?} is too large")))
}

/// Render cents as a fixed two-decimal dollar string (`1234` -> `"12.34"`).
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let per_dollar = CENTS_PER_DOLLAR.unsigned_abs();
    format!("{sign}{}.{:02}", abs / per_dollar, abs % per_dollar)
}
