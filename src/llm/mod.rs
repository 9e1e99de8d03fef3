//! Remote language-model access.

pub mod groq_client;

pub use groq_client::{ChatMessage, ChatRequest, ChatRole, CompletionBackend, GroqClient, LlmError};
