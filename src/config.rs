//! Configuration module - CLI arguments and settings

use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Environment variable overriding the runtime host URL
pub const ENV_HOST: &str = "STATA_LLAMA_HOST";

/// Environment variable overriding the model name
pub const ENV_MODEL: &str = "STATA_LLAMA_MODEL";

/// Default Ollama host
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Default model name
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Which runtime API flavor to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Ollama /api/chat (NDJSON streaming)
    #[default]
    Ollama,
    /// OpenAI-compatible /v1/chat/completions (llama-server, SSE streaming)
    OpenAiCompat,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAiCompat => write!(f, "openai-compat"),
        }
    }
}

/// Optional configuration parameters for Config::new()
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub stop: Vec<String>,
    pub system_message: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub model: String,
    pub backend: BackendKind,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stop: Vec<String>,
    pub system_message: String,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Create a new Config with required host and model, plus optional settings
    pub fn new(
        host: String,
        model: String,
        backend: BackendKind,
        options: ConfigOptions,
    ) -> Result<Arc<Self>> {
        let host = normalize_host(&host);

        if host.is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }

        let model = model.trim().to_string();
        if model.is_empty() {
            return Err(anyhow!("model cannot be empty"));
        }

        Ok(Arc::new(Self {
            host,
            model,
            backend,
            temperature: options.temperature.unwrap_or(0.7),
            max_tokens: options.max_tokens.unwrap_or(2048),
            top_p: options.top_p.unwrap_or(0.9),
            stop: options.stop,
            system_message: options.system_message.unwrap_or_default(),
            request_timeout_secs: options.request_timeout_secs.unwrap_or(120),
        }))
    }

    /// Resolve the host from an optional CLI value, then the environment,
    /// then the built-in default
    pub fn resolve_host(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(ENV_HOST).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Resolve the model name from an optional CLI value, then the
    /// environment, then the built-in default
    pub fn resolve_model(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(ENV_MODEL).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }
}

/// Normalize a runtime host URL: default the scheme to http:// (these are
/// loopback runtimes) and strip any trailing slash
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else if host.is_empty() {
        String::new()
    } else {
        format!("http://{}", host)
    };

    host.trim_end_matches('/').to_string()
}
