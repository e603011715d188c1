//! CSV host for the validator and the reports.
//!
//! Reads entries from CSV (`cpf,value` header) record by record, admits each
//! through [`crate::validator::admit`] and keeps the accepted ones in input
//! order. Report writers render [`crate::aggregate`] results back to CSV.

use crate::aggregate::{AverageRanking, Balance, Extremes};
use crate::entry::{Entry, EntryRecord};
use crate::error::Result;
use crate::validator;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, warn};
use std::io::{Read, Write};

/// Counts from one pass over an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Rows admitted as entries.
    pub accepted: usize,

    /// Rows refused by validation or unreadable as CSV.
    pub rejected: usize,
}

/// The accepted entries of a ledger, in the order they were read.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<Entry>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger {
            entries: Vec::new(),
        }
    }

    /// Appends an already admitted entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Accepted entries in input order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads entries from a CSV reader in streaming fashion.
    ///
    /// Rows that fail validation or cannot be read are logged at warn level
    /// and skipped; they never abort the load.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        try_for_each_row(reader, |row, outcome| {
            match outcome {
                RowOutcome::Admitted(entry) => {
                    debug!("Row {}: Admitted {} for CPF {}", row, entry.value, entry.cpf);
                    self.entries.push(entry);
                    summary.accepted += 1;
                }
                RowOutcome::Rejected(record, reason) => {
                    warn!("Row {}: CPF {:?} rejected: {}", row, record.cpf, reason);
                    summary.rejected += 1;
                }
                RowOutcome::Unreadable(e) => {
                    warn!("Row {}: CSV parse error: {}", row, e);
                    summary.rejected += 1;
                }
            }
            Ok(())
        })?;

        Ok(summary)
    }
}

enum RowOutcome {
    Admitted(Entry),
    Rejected(EntryRecord, validator::Rejection),
    Unreadable(csv::Error),
}

/// Column positions of `cpf` and `value` in the header row.
struct Columns {
    cpf: Option<usize>,
    value: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Columns {
            cpf: headers.iter().position(|h| h == "cpf"),
            value: headers.iter().position(|h| h == "value"),
        }
    }

    /// Builds the raw entry for one row.
    ///
    /// Rows may be shorter than the header; a missing or empty field reads
    /// as absent.
    fn record(&self, row: &StringRecord) -> EntryRecord {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).filter(|f| !f.is_empty());

        EntryRecord {
            cpf: field(self.cpf).unwrap_or_default().to_string(),
            value: field(self.value).map(str::to_string),
        }
    }
}

/// Runs every CSV row through the validator, passing the 1-based row number
/// (header is row 1) and the outcome to `visit`.
///
/// Stops at the first error returned by `visit`.
fn try_for_each_row<R, F>(reader: R, mut visit: F) -> Result<()>
where
    R: Read,
    F: FnMut(usize, RowOutcome) -> Result<()>,
{
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(csv_reader.headers()?);

    for (row_idx, result) in csv_reader.records().enumerate() {
        let row_num = row_idx + 2;

        let outcome = match result {
            Ok(row) => {
                let record = columns.record(&row);
                match validator::admit(&record) {
                    Ok(entry) => RowOutcome::Admitted(entry),
                    Err(reason) => RowOutcome::Rejected(record, reason),
                }
            }
            Err(e) => RowOutcome::Unreadable(e),
        };
        visit(row_num, outcome)?;
    }

    Ok(())
}

/// Validates every row and writes a `row,cpf,status,reason` report.
///
/// Nothing is kept; this is the validation-only pass. Reading stops at the
/// first write failure.
pub fn check_csv<R: Read, W: Write>(reader: R, writer: W) -> Result<LoadSummary> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["row", "cpf", "status", "reason"])?;

    let mut summary = LoadSummary::default();

    try_for_each_row(reader, |row, outcome| {
        let line = match outcome {
            RowOutcome::Admitted(entry) => {
                summary.accepted += 1;
                [row.to_string(), entry.cpf, "accepted".to_string(), String::new()]
            }
            RowOutcome::Rejected(record, reason) => {
                debug!("Row {}: CPF {:?} rejected: {}", row, record.cpf, reason);
                summary.rejected += 1;
                [
                    row.to_string(),
                    record.cpf,
                    "rejected".to_string(),
                    reason.to_string(),
                ]
            }
            RowOutcome::Unreadable(e) => {
                warn!("Row {}: CSV parse error: {}", row, e);
                summary.rejected += 1;
                [
                    row.to_string(),
                    String::new(),
                    "unreadable".to_string(),
                    e.to_string(),
                ]
            }
        };

        csv_writer.write_record(&line)?;
        Ok(())
    })?;

    csv_writer.flush()?;
    Ok(summary)
}

/// Creates a CSV writer whose header row is written explicitly, so empty
/// reports still carry one.
fn report_writer<W: Write>(writer: W, header: &[&str]) -> Result<csv::Writer<W>> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(header)?;
    Ok(csv_writer)
}

/// Writes balances as `cpf,balance`, keeping the given order.
pub fn write_balances<W: Write>(balances: &[Balance], writer: W) -> Result<()> {
    let mut csv_writer = report_writer(writer, &["cpf", "balance"])?;

    for balance in balances {
        csv_writer.serialize(balance)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes averages as `cpf,average`, keeping the given order.
pub fn write_averages<W: Write>(averages: &[AverageRanking], writer: W) -> Result<()> {
    let mut csv_writer = report_writer(writer, &["cpf", "average"])?;

    for ranking in averages {
        csv_writer.serialize(ranking)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes extremes as `cpf,kind,value` with a `min` and a `max` row.
///
/// Only the header is written when there are no extremes.
pub fn write_extremes<W: Write>(extremes: Option<&Extremes>, writer: W) -> Result<()> {
    let mut csv_writer = report_writer(writer, &["cpf", "kind", "value"])?;

    if let Some(pair) = extremes {
        for (kind, entry) in [("min", &pair.min), ("max", &pair.max)] {
            csv_writer.serialize((entry.cpf.as_str(), kind, entry.value))?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
