//! stata-llama library - local Stata code assistant backed by an LLM runtime

pub mod analysis;
pub mod config;
pub mod enhancer;
pub mod eval;
pub mod repl;
pub mod service;
pub mod web;

// Re-export commonly used types
pub use config::{BackendKind, Config, ConfigOptions};
pub use enhancer::PromptEnhancer;
pub use service::{BackendError, ModelClient};
