use clap::{Parser, Subcommand};
use leadpay::application::engine::PayrollEngine;
use leadpay::application::registry::Registry;
use leadpay::domain::ports::{LedgerStoreRef, RegistryStoreRef};
use leadpay::domain::records::PayPeriodId;
use leadpay::infrastructure::in_memory::{InMemoryLedgerStore, InMemoryRegistryStore};
use leadpay::interfaces::csv::summary_writer::{SummaryWriter, export_file_name};
use leadpay::interfaces::json::dataset_reader::Dataset;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON dataset loaded into the store before the command runs
    #[arg(long, env = "LEADPAY_SEED")]
    seed: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LEADPAY_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute payroll for a pay period and record a new run
    Run { pay_period_id: PayPeriodId },
    /// Print the latest run of a pay period as JSON
    Summary { pay_period_id: PayPeriodId },
    /// Export the latest run of a pay period as CSV
    Export {
        pay_period_id: PayPeriodId,
        /// Write payroll_<id>.csv into this directory instead of stdout
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the lead conversion report as JSON
    Report,
    /// Lock a pay period against further runs
    Lock { pay_period_id: PayPeriodId },
}

fn in_memory_stores() -> (RegistryStoreRef, LedgerStoreRef) {
    (
        Arc::new(InMemoryRegistryStore::new()),
        Arc::new(InMemoryLedgerStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<(RegistryStoreRef, LedgerStoreRef)> {
    match db_path {
        Some(path) => {
            let store = leadpay::infrastructure::rocksdb::RocksDBStore::open(path)?;
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<(RegistryStoreRef, LedgerStoreRef)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value).into_diagnostic()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (registry_store, ledger_store) = open_stores(cli.db_path.as_deref())?;
    let registry = Registry::new(registry_store.clone());
    let engine = PayrollEngine::new(registry_store, ledger_store);

    if let Some(seed) = cli.seed {
        let file = File::open(seed).into_diagnostic()?;
        Dataset::from_reader(file)?.seed(&registry).await?;
    }

    match cli.command {
        Command::Run { pay_period_id } => {
            let run = engine.compute_payroll(pay_period_id).await?;
            print_json(&run)?;
        }
        Command::Summary { pay_period_id } => {
            let rows = engine.payroll_summary(pay_period_id).await?;
            print_json(&rows)?;
        }
        Command::Export {
            pay_period_id,
            out_dir,
        } => {
            let rows = engine.payroll_summary(pay_period_id).await?;
            match out_dir {
                Some(dir) => {
                    let file = File::create(dir.join(export_file_name(pay_period_id)))
                        .into_diagnostic()?;
                    SummaryWriter::new(file).write_rows(&rows)?;
                }
                None => {
                    let stdout = io::stdout();
                    SummaryWriter::new(stdout.lock()).write_rows(&rows)?;
                }
            }
        }
        Command::Report => {
            let report = engine.conversion_report().await?;
            print_json(&report)?;
        }
        Command::Lock { pay_period_id } => {
            let period = registry.lock_pay_period(pay_period_id).await?;
            print_json(&period)?;
        }
    }

    Ok(())
}
