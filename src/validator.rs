//! Admission checks for incoming entries.
//!
//! Checks run in a fixed order and the first failure decides the reported
//! [`Rejection`]:
//!
//! 1. CPF contains only digits
//! 2. CPF passes the check-digit algorithm
//! 3. Value is numeric
//! 4. Value does not exceed 15000.00
//! 5. Value is not below -2000.00

use crate::amount::Amount;
use crate::cpf;
use crate::entry::{Entry, EntryRecord};
use std::str::FromStr;
use thiserror::Error;

/// Why an entry was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// CPF is empty or has a character other than an ASCII digit
    #[error("CPF must contain only numeric characters")]
    NonNumericCpf,

    /// CPF fails the length, repeated-digit or check-digit rules
    #[error("Invalid CPF")]
    InvalidCpf,

    /// Value is missing or not a plain decimal number
    #[error("Value must be numeric")]
    NonNumericValue,

    /// Value is above `Amount::MAX_ENTRY`
    #[error("Value cannot exceed 15000.00")]
    ValueTooHigh,

    /// Value is below `Amount::MIN_ENTRY`
    #[error("Value cannot be less than -2000.00")]
    ValueTooLow,
}

/// Checks a record without keeping the parsed entry.
pub fn validate(record: &EntryRecord) -> Result<(), Rejection> {
    admit(record).map(|_| ())
}

/// Checks a record and, if it passes, returns the typed entry.
pub fn admit(record: &EntryRecord) -> Result<Entry, Rejection> {
    if record.cpf.is_empty() || !record.cpf.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Rejection::NonNumericCpf);
    }

    if !cpf::is_valid(&record.cpf) {
        return Err(Rejection::InvalidCpf);
    }

    let value = record
        .value
        .as_deref()
        .and_then(parse_value)
        .ok_or(Rejection::NonNumericValue)?;

    if value > Amount::MAX_ENTRY {
        return Err(Rejection::ValueTooHigh);
    }

    if value < Amount::MIN_ENTRY {
        return Err(Rejection::ValueTooLow);
    }

    Ok(Entry::new(record.cpf.clone(), value))
}

/// Parses a plain decimal: optional sign, digits and at most one point.
///
/// `rust_decimal` also accepts `_` separators, which are not numbers here.
fn parse_value(raw: &str) -> Option<Amount> {
    let text = raw.trim();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);

    let well_formed = unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && unsigned.bytes().filter(|&b| b == b'.').count() <= 1;
    if !well_formed {
        return None;
    }

    Amount::from_str(text).ok()
}
