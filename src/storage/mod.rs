//! Persistence for analysis results.

pub mod log_store;
pub mod record;

pub use log_store::{CsvLogStore, HISTORY_LIMIT, StoreError, StoreResult};
pub use record::{AnalysisRecord, TIMESTAMP_FORMAT, TRANSCRIPT_EXCERPT_CHARS};
