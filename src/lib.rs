//! # CPF Ledger
//!
//! Validates ledger entries ("lançamentos") that tie a CPF to a signed amount,
//! and derives per-CPF reports from the accepted entries.
//!
//! ## Design Principles
//!
//! - **Exact arithmetic**: Amounts are `rust_decimal` values, never floats
//! - **Validation as a gate**: [`validator::admit`] turns an untrusted
//!   [`EntryRecord`] into an [`Entry`] or a [`Rejection`]
//! - **Pure reports**: [`aggregate`] functions never mutate their input and keep
//!   no state between calls
//! - **Deterministic output**: Reports follow first-seen CPF order, rankings use
//!   a stable sort
//!
//! ## Example
//!
//! ```
//! use cpf_ledger::{aggregate, Ledger};
//! use std::io::Cursor;
//!
//! let csv = "cpf,value\n52998224725,100.00\n52998224725,-50\n11144477735,10\n";
//! let mut ledger = Ledger::new();
//! let summary = ledger.load_csv(Cursor::new(csv)).unwrap();
//! assert_eq!(summary.accepted, 3);
//!
//! let balances = aggregate::balances_by_account(ledger.entries());
//! assert_eq!(balances[0].balance.to_string(), "50.00");
//! ```

pub mod aggregate;
pub mod amount;
pub mod cpf;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod validator;

pub use aggregate::{AverageRanking, Balance, Extremes, DEFAULT_TOP_LIMIT};
pub use amount::Amount;
pub use entry::{Entry, EntryRecord};
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LoadSummary};
pub use validator::{admit, validate, Rejection};
