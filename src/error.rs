use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PayrollError {
    #[error("{entity} {id} not found")]
    #[diagnostic(code(leadpay::not_found))]
    NotFound { entity: &'static str, id: u32 },
    #[error("Pay period {0} is locked")]
    #[diagnostic(
        code(leadpay::period_locked),
        help("locked periods accept no further payroll runs")
    )]
    PeriodLocked(u32),
    #[error("Validation error: {0}")]
    #[diagnostic(code(leadpay::validation))]
    ValidationError(String),
    #[error("CSV error: {0}")]
    #[diagnostic(code(leadpay::csv))]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    #[diagnostic(code(leadpay::json))]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    #[diagnostic(code(leadpay::io))]
    IoError(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    #[diagnostic(code(leadpay::storage))]
    StorageError(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    #[diagnostic(code(leadpay::storage))]
    RocksDbError(#[from] rocksdb::Error),
}

impl PayrollError {
    pub fn not_found(entity: &'static str, id: u32) -> Self {
        Self::NotFound { entity, id }
    }

    /// Machine-readable kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PeriodLocked(_) => "period_locked",
            Self::ValidationError(_) => "validation",
            Self::CsvError(_) => "csv",
            Self::JsonError(_) => "json",
            Self::IoError(_) => "io",
            Self::StorageError(_) => "storage",
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDbError(_) => "storage",
        }
    }
}

pub type Result<T> = std::result::Result<T, PayrollError>;
