//! Customer call transcript analysis service.
//!
//! Transcripts are summarized and classified by a remote chat-completions
//! model, and every result is appended to a CSV log.

// Forbidden practices
#![deny(warnings)] // Every warning is an error
#![deny(unsafe_code)] // No unsafe code
#![deny(missing_docs)] // Every public item is documented
#![deny(dead_code)] // No unused code
#![deny(non_camel_case_types)] // Types are CamelCase

// Nothing slips through
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)] // Results and Options are handled explicitly
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

// Clippy discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)] // No unwrap()
#![deny(clippy::expect_used)] // No expect()
#![deny(clippy::panic)] // No panic!()
#![deny(clippy::print_stdout)] // Logging goes through tracing
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)] // const wherever possible
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]

#![deny(overflowing_literals)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Transcript summarization and sentiment parsing.
pub mod analysis;
/// Environment-driven configuration.
#[allow(clippy::module_name_repetitions)]
pub mod config;
/// Remote chat-completions client.
#[allow(clippy::module_name_repetitions)]
pub mod llm;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Entry helpers to start the service.
pub mod start_call_analyzer;
/// CSV analysis log.
pub mod storage;
/// String truncation helpers.
pub mod text;
