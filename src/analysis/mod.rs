//! Transcript analysis on top of the remote completion API.

pub mod analyzer;

pub use analyzer::{
    AnalysisOutcome, Analyzer, ERROR_SENTIMENT, ERROR_SUMMARY_PREFIX, parse_response,
};
