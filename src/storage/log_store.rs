//! Append-only CSV log of analysis results.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::record::AnalysisRecord;

/// Number of records served by `/history`.
pub const HISTORY_LIMIT: usize = 10;

/// Log store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// CSV encoding or decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// The blocking task running the file operation did not complete.
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Convenience result alias for log store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// CSV-backed analysis log.
///
/// Rows are appended with a single write on an append-mode handle. Appends
/// through the same store (or its clones) are serialized, so the header row is
/// written once. Other processes writing the same file may interleave rows.
#[derive(Clone, Debug)]
pub struct CsvLogStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvLogStore {
    /// Create a store over `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one analysis result and return the record written.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub async fn append(
        &self,
        transcript: &str,
        summary: &str,
        sentiment: &str,
    ) -> StoreResult<AnalysisRecord> {
        let record = AnalysisRecord::new(transcript, summary, sentiment);
        let path = self.path.clone();
        let row = record.clone();
        let guard = self.write_lock.lock().await;
        let written = tokio::task::spawn_blocking(move || append_record(&path, &row)).await;
        drop(guard);
        written??;
        Ok(record)
    }

    /// Return the last `limit` records, oldest first.
    ///
    /// A missing file yields an empty list.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or decoded.
    pub async fn read_recent(&self, limit: usize) -> StoreResult<Vec<AnalysisRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_recent_records(&path, limit)).await?
    }
}

fn append_record(path: &Path, record: &AnalysisRecord) -> StoreResult<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(Vec::new());
    writer.serialize(record)?;
    let row = writer.into_inner().map_err(|e| e.into_error())?;

    file.write_all(&row)?;
    file.flush()?;

    debug!(
        "Appended analysis record to {} (header written: {needs_header})",
        path.display()
    );
    Ok(())
}

fn read_recent_records(path: &Path, limit: usize) -> StoreResult<Vec<AnalysisRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));
    reader.headers()?;

    let mut recent = VecDeque::with_capacity(limit.min(HISTORY_LIMIT));
    for row in reader.deserialize::<AnalysisRecord>() {
        let record = row?;
        if limit == 0 {
            continue;
        }
        if recent.len() == limit {
            recent.pop_front();
        }
        recent.push_back(record);
    }

    Ok(recent.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CsvLogStore {
        CsvLogStore::new(dir.path().join("call_analysis.csv"))
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.read_recent(HISTORY_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_read_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let written = store
            .append(
                "Customer called about a billing error, \"twice\", on line 2.\nResolved.",
                "Billing error, resolved.",
                "neutral",
            )
            .await
            .unwrap();

        let records = store.read_recent(1).await.unwrap();
        assert_eq!(records, vec![written.clone()]);
        assert_eq!(
            written.transcript_excerpt,
            "Customer called about a billing error, \"twice\", on line 2.\nResolved."
        );
        assert_eq!(written.summary, "Billing error, resolved.");
        assert_eq!(written.sentiment, "neutral");
    }

    #[tokio::test]
    async fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for i in 0..3 {
            store
                .append(&format!("transcript {i}"), "summary", "positive")
                .await
                .unwrap();
        }

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Timestamp,Transcript,Summary,Sentiment"));
        assert_eq!(
            contents.matches("Timestamp,Transcript,Summary,Sentiment").count(),
            1
        );
        assert_eq!(lines.count(), 3);
    }

    #[tokio::test]
    async fn test_read_recent_keeps_last_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for i in 0..15 {
            store
                .append(&format!("transcript number {i}"), &format!("summary {i}"), "neutral")
                .await
                .unwrap();
        }

        let records = store.read_recent(HISTORY_LIMIT).await.unwrap();
        assert_eq!(records.len(), 10);
        let summaries: Vec<&str> = records.iter().map(|r| r.summary.as_str()).collect();
        let expected: Vec<String> = (5..15).map(|i| format!("summary {i}")).collect();
        assert_eq!(summaries, expected);

        assert!(store.read_recent(0).await.unwrap().is_empty());
        assert_eq!(store.read_recent(100).await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_long_transcript_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append(&"x".repeat(600), "s", "negative").await.unwrap();

        let records = store.read_recent(1).await.unwrap();
        assert_eq!(records[0].transcript_excerpt, format!("{}...", "x".repeat(500)));
    }

    #[tokio::test]
    async fn test_io_errors_surface() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending or parsed as CSV.
        let store = CsvLogStore::new(dir.path());
        assert!(store.append("some transcript", "s", "neutral").await.is_err());
        assert!(store.read_recent(HISTORY_LIMIT).await.is_err());
    }

    #[tokio::test]
    async fn test_read_recent_with_unbounded_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("one short transcript", "s", "neutral").await.unwrap();

        let records = store.read_recent(usize::MAX).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, "s");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_first_appends_write_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&format!("transcript {i}"), &format!("summary {i}"), "neutral")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents.matches("Timestamp,Transcript,Summary,Sentiment").count(),
            1
        );

        let records = store.read_recent(usize::MAX).await.unwrap();
        assert_eq!(records.len(), 100);
        assert!(records.iter().all(|r| r.sentiment == "neutral"));
    }
}
