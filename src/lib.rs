//! Turns natural-language requests into shell commands, and explains existing ones,
//! using a local Ollama-compatible inference server.

pub mod config;
pub mod error;
pub mod llm;

pub use config::Config;
pub use error::{AssistError, Result, TransportError};
pub use llm::{ExplainOutcome, LLMClient, Metrics, SuggestOutcome, Suggestion};
