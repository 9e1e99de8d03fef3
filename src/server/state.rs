//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::AppConfig;
use crate::llm::{CompletionBackend, GroqClient, LlmError};
use crate::storage::CsvLogStore;

/// Shared application state.
pub struct AppState {
    /// Transcript analyzer bound to the remote completion API.
    pub analyzer: Analyzer,
    /// Analysis log.
    pub store: CsvLogStore,
    /// Directory served for non-API paths.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create the application state with a Groq client built from `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &AppConfig) -> Result<Arc<Self>, LlmError> {
        let client = GroqClient::new(&config.llm)?;
        tracing::info!("Completion model: {}", client.model());
        Ok(Self::with_backend(Arc::new(client), config))
    }

    /// Create the application state over an arbitrary completion backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn CompletionBackend>, config: &AppConfig) -> Arc<Self> {
        Arc::new(Self {
            analyzer: Analyzer::new(backend, &config.llm),
            store: CsvLogStore::new(config.log_path.clone()),
            static_dir: config.static_dir.clone(),
        })
    }
}
