//! Model runtime backends

pub(crate) mod ollama;
pub(crate) mod openai;

pub mod client;
pub mod common;

// Re-export commonly used items
pub use client::ModelClient;
pub use common::{BackendError, ChatMessage, GenerationOptions};
