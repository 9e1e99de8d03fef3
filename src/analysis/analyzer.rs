//! Transcript analysis: prompt construction and response parsing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm::{ChatMessage, ChatRequest, CompletionBackend};

/// System prompt sent with every analysis.
const ANALYSIS_SYSTEM_PROMPT: &str = "You are a customer service analysis expert.
Analyze the customer call transcript and provide:
1. A concise 2-3 sentence summary
2. The customer's sentiment (positive/neutral/negative)

Format your response exactly as:
SUMMARY: [2-3 sentence summary]
SENTIMENT: [positive/neutral/negative]";

const SUMMARY_PREFIX: &str = "SUMMARY:";
const SENTIMENT_PREFIX: &str = "SENTIMENT:";

/// Sentiment recorded when the remote call fails.
pub const ERROR_SENTIMENT: &str = "error";
/// Prefix of the summary recorded when the remote call fails.
pub const ERROR_SUMMARY_PREFIX: &str = "Error analyzing transcript:";

/// Summary and sentiment extracted for one transcript.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Short summary, or an error message.
    pub summary: String,
    /// Lower-cased sentiment label, `error`, or empty if the model omitted it.
    pub sentiment: String,
}

impl AnalysisOutcome {
    /// Outcome recorded when the remote capability could not be used.
    #[must_use]
    pub fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            summary: format!("{ERROR_SUMMARY_PREFIX} {detail}"),
            sentiment: ERROR_SENTIMENT.to_string(),
        }
    }

    /// Whether this outcome records a remote failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.sentiment == ERROR_SENTIMENT
    }
}

/// Summarizes transcripts and classifies customer sentiment.
#[derive(Clone)]
pub struct Analyzer {
    backend: Arc<dyn CompletionBackend>,
    temperature: f64,
    max_tokens: u32,
}

impl Analyzer {
    /// Create an analyzer over a completion backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &LlmConfig) -> Self {
        Self {
            backend,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Build the completion request for a transcript.
    #[must_use]
    pub fn build_request(&self, transcript: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Analyze this customer call transcript:\n\n{transcript}"
                )),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Analyze a transcript.
    ///
    /// Remote failures are folded into the outcome (see [`AnalysisOutcome::failed`]);
    /// this never returns an error.
    pub async fn analyze(&self, transcript: &str) -> AnalysisOutcome {
        let request = self.build_request(transcript);
        debug!("Analyzing transcript of {} chars", transcript.chars().count());

        match self.backend.complete(&request).await {
            Ok(text) => {
                let outcome = parse_response(&text);
                if outcome.summary.is_empty() || outcome.sentiment.is_empty() {
                    warn!("Model response did not follow the SUMMARY/SENTIMENT format");
                }
                outcome
            }
            Err(e) => {
                warn!("Transcript analysis failed: {e}");
                AnalysisOutcome::failed(e)
            }
        }
    }
}

/// Extract summary and sentiment from a model response.
///
/// The first line starting with `SUMMARY:` and the first starting with
/// `SENTIMENT:` win. Missing fields stay empty.
#[must_use]
pub fn parse_response(response: &str) -> AnalysisOutcome {
    let mut summary: Option<String> = None;
    let mut sentiment: Option<String> = None;

    for line in response.lines() {
        if summary.is_none() {
            if let Some(rest) = line.strip_prefix(SUMMARY_PREFIX) {
                summary = Some(rest.trim().to_string());
                continue;
            }
        }
        if sentiment.is_none() {
            if let Some(rest) = line.strip_prefix(SENTIMENT_PREFIX) {
                sentiment = Some(rest.trim().to_lowercase());
            }
        }
    }

    AnalysisOutcome {
        summary: summary.unwrap_or_default(),
        sentiment: sentiment.unwrap_or_default(),
    }
}
