//! Persisted analysis record.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::text::ellipsize;

/// Maximum transcript characters kept in a record.
pub const TRANSCRIPT_EXCERPT_CHARS: usize = 500;

/// Timestamp layout used in the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One analysis result as stored in the log and returned by `/history`.
///
/// Field names follow the CSV header row
/// (`Timestamp,Transcript,Summary,Sentiment`) in both CSV and JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRecord {
    /// Local creation time, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// First 500 characters of the transcript, with `...` if truncated.
    #[serde(rename = "Transcript")]
    pub transcript_excerpt: String,
    /// Summary text or error message.
    #[serde(rename = "Summary")]
    pub summary: String,
    /// Sentiment label.
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
}

impl AnalysisRecord {
    /// Build a record stamped with the current local time.
    #[must_use]
    pub fn new(transcript: &str, summary: &str, sentiment: &str) -> Self {
        Self::at(Local::now(), transcript, summary, sentiment)
    }

    /// Build a record stamped with `at`.
    #[must_use]
    pub fn at(at: DateTime<Local>, transcript: &str, summary: &str, sentiment: &str) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            transcript_excerpt: ellipsize(transcript, TRANSCRIPT_EXCERPT_CHARS),
            summary: summary.to_string(),
            sentiment: sentiment.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamp_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let record = AnalysisRecord::at(at, "short call", "s", "neutral");
        assert_eq!(record.timestamp, "2024-03-09 14:05:07");
    }

    #[test]
    fn test_excerpt_truncation() {
        let exact = "a".repeat(TRANSCRIPT_EXCERPT_CHARS);
        assert_eq!(AnalysisRecord::new(&exact, "", "").transcript_excerpt, exact);

        let long = "b".repeat(TRANSCRIPT_EXCERPT_CHARS + 100);
        let record = AnalysisRecord::new(&long, "", "");
        assert_eq!(record.transcript_excerpt.len(), TRANSCRIPT_EXCERPT_CHARS + 3);
        assert!(record.transcript_excerpt.ends_with("..."));
    }

    #[test]
    fn test_json_uses_header_names() {
        let record = AnalysisRecord {
            timestamp: "2024-01-01 00:00:00".to_string(),
            transcript_excerpt: "t".to_string(),
            summary: "s".to_string(),
            sentiment: "positive".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Timestamp"], "2024-01-01 00:00:00");
        assert_eq!(json["Transcript"], "t");
        assert_eq!(json["Summary"], "s");
        assert_eq!(json["Sentiment"], "positive");
    }
}
