//! Common types shared by the runtime backends

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

/// Chat message with a role tag ("system", "user", "assistant")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Generation parameter bag recognized by both backends
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

impl GenerationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            stop: config.stop.clone(),
        }
    }
}

/// Errors from the model runtime. Callers surface the message to the user
/// and do not retry automatically.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("model runtime unreachable at {host}: {reason}")]
    Unreachable { host: String, reason: String },

    #[error("model '{model}' not found on the runtime")]
    ModelNotFound { model: String },

    #[error("model runtime returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse runtime response: {0}")]
    Parse(String),

    #[error("model runtime returned an empty response")]
    Empty,
}

impl BackendError {
    /// Map a failed reqwest send to the error taxonomy
    pub fn from_request(host: &str, err: reqwest::Error) -> Self {
        Self::Unreachable {
            host: host.to_string(),
            reason: err.to_string(),
        }
    }

    /// Map a non-success HTTP status to the error taxonomy
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        if status == 404 {
            Self::ModelNotFound {
                model: model.to_string(),
            }
        } else {
            Self::Api { status, body }
        }
    }
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
