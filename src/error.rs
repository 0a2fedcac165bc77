use camino::Utf8PathBuf;
use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TrendsError {
    #[error("required input file missing: {0}")]
    MissingResource(Utf8PathBuf),

    #[error("invalid gene symbol: {0:?}")]
    InvalidGeneSymbol(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to fetch raw data for {date}: {message}")]
    Fetch { date: NaiveDate, message: String },

    #[error("failed to process day {date}: {message}")]
    DayProcessing { date: NaiveDate, message: String },

    #[error("Wikimedia request failed: {0}")]
    WikimediaHttp(String),

    #[error("Wikimedia returned status {status}: {message}")]
    WikimediaStatus { status: u16, message: String },

    #[error("PubMed request failed: {0}")]
    PubmedHttp(String),

    #[error("PubMed returned status {status}: {message}")]
    PubmedStatus { status: u16, message: String },

    #[error("malformed snapshot file {path}: {message}")]
    SnapshotParse { path: Utf8PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
