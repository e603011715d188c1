//! Ledger entry models for CSV parsing and internal representation.

use crate::amount::Amount;

/// Raw entry as read from CSV.
///
/// Nothing about it is trusted yet: the CPF may hold any text and the value
/// may be absent or not a number. [`crate::validator::admit`] turns it into
/// an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Taxpayer identifier as received.
    pub cpf: String,

    /// Amount as received; `None` when the column is missing or empty.
    pub value: Option<String>,
}

impl EntryRecord {
    /// Creates a record from raw field values.
    pub fn new(cpf: impl Into<String>, value: impl Into<String>) -> Self {
        EntryRecord {
            cpf: cpf.into(),
            value: Some(value.into()),
        }
    }
}

/// An admitted ledger entry ("lançamento").
///
/// Many entries may share a CPF. Entries are never modified once admitted;
/// reports are derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 11-digit CPF.
    pub cpf: String,

    /// Signed amount within `[Amount::MIN_ENTRY, Amount::MAX_ENTRY]`.
    pub value: Amount,
}

impl Entry {
    /// Creates an entry without validating it.
    ///
    /// Use [`crate::validator::admit`] for data from outside the process.
    pub fn new(cpf: impl Into<String>, value: Amount) -> Self {
        Entry {
            cpf: cpf.into(),
            value,
        }
    }
}
