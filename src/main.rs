//! CPF Ledger CLI
//!
//! Reads ledger entries from a CSV file (`cpf,value`), admits the valid ones
//! and prints the requested report as CSV on stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- balances entries.csv > balances.csv
//! cargo run -- extremes entries.csv --cpf 52998224725
//! cargo run -- top-averages entries.csv --limit 5
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to see admitted and rejected rows

use clap::{Parser, Subcommand};
use cpf_ledger::ledger::{check_csv, write_averages, write_balances, write_extremes};
use cpf_ledger::{aggregate, Ledger, Result, DEFAULT_TOP_LIMIT};
use log::info;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "cpf-ledger")]
#[command(about = "Validate CPF ledger entries and report balances, rankings and extremes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate every row and report whether it was accepted
    Check {
        /// Input CSV with a `cpf,value` header
        input: PathBuf,
    },
    /// Balance per CPF, in first-seen order
    Balances {
        /// Input CSV with a `cpf,value` header
        input: PathBuf,
    },
    /// Smallest and largest entry for one CPF
    Extremes {
        /// Input CSV with a `cpf,value` header
        input: PathBuf,

        /// CPF to look up
        #[arg(long)]
        cpf: String,
    },
    /// CPFs with the highest balances
    TopBalances {
        /// Input CSV with a `cpf,value` header
        input: PathBuf,

        /// Number of CPFs to report
        #[arg(short, long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
    /// CPFs with the highest average entry value
    TopAverages {
        /// Input CSV with a `cpf,value` header
        input: PathBuf,

        /// Number of CPFs to report
        #[arg(short, long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    let stdout = io::stdout();
    let handle = stdout.lock();

    match command {
        Command::Check { input } => {
            let reader = BufReader::new(File::open(input)?);
            let summary = check_csv(reader, handle)?;
            info!(
                "Checked {} rows: {} accepted, {} rejected",
                summary.accepted + summary.rejected,
                summary.accepted,
                summary.rejected
            );
        }
        Command::Balances { input } => {
            let ledger = load(&input)?;
            let balances = aggregate::balances_by_account(ledger.entries());
            write_balances(&balances, handle)?;
        }
        Command::Extremes { input, cpf } => {
            let ledger = load(&input)?;
            let extremes = aggregate::extremes_for_cpf(&cpf, ledger.entries());
            write_extremes(extremes.as_ref(), handle)?;
        }
        Command::TopBalances { input, limit } => {
            let ledger = load(&input)?;
            let top = aggregate::top_balances(ledger.entries(), limit);
            write_balances(&top, handle)?;
        }
        Command::TopAverages { input, limit } => {
            let ledger = load(&input)?;
            let top = aggregate::top_averages(ledger.entries(), limit);
            write_averages(&top, handle)?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Ledger> {
    let reader = BufReader::new(File::open(path)?);

    let mut ledger = Ledger::new();
    let summary = ledger.load_csv(reader)?;
    info!(
        "Loaded {}: {} accepted, {} rejected",
        path.display(),
        summary.accepted,
        summary.rejected
    );

    Ok(ledger)
}
