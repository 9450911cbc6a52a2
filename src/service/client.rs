//! Model runtime client
//!
//! One capability surface (`generate`, `stream_generate`) over two
//! interchangeable backends selected by configuration. The prompt text
//! handed in here is already enhanced; this module only moves it over the
//! wire.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::{BackendKind, Config};

use super::common::{BackendError, ChatMessage, GenerationOptions};
use super::{ollama, openai};

/// Buffered fragments between the relay task and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Client for a locally hosted model runtime
#[derive(Debug, Clone)]
pub struct ModelClient {
    config: Arc<Config>,
    client: Client,
}

impl ModelClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Role-tagged message sequence: optional system guidance, then the
    /// user prompt
    fn build_messages(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if !self.config.system_message.is_empty() {
            messages.push(ChatMessage::system(self.config.system_message.clone()));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Generate a single completed response
    pub async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let messages = self.build_messages(prompt);
        let options = GenerationOptions::from_config(&self.config);
        let start = Instant::now();

        let result = match self.config.backend {
            BackendKind::Ollama => {
                ollama::generate(&self.client, &self.config, messages, options).await
            }
            BackendKind::OpenAiCompat => {
                openai::generate(&self.client, &self.config, messages, options).await
            }
        };

        info!(
            "Generation via {} completed in {}ms",
            self.config.backend,
            start.elapsed().as_millis()
        );
        result
    }

    /// Generate a streamed response. Fragments arrive on the returned
    /// channel; the channel closing is the end signal. Failures, including
    /// request-level ones, are delivered as a final `Err` item.
    pub fn stream_generate(&self, prompt: &str) -> mpsc::Receiver<Result<String, BackendError>> {
        let messages = self.build_messages(prompt);
        let options = GenerationOptions::from_config(&self.config);
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        let client = self.client.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let result = match config.backend {
                BackendKind::Ollama => {
                    ollama::stream_generate(&client, &config, messages, options, tx.clone()).await
                }
                BackendKind::OpenAiCompat => {
                    openai::stream_generate(&client, &config, messages, options, tx.clone()).await
                }
            };

            // Request-level failures (unreachable host, bad status) happen
            // before any fragment is produced; relay them on the channel.
            if let Err(e) = result {
                let _ = tx.send(Err(e)).await;
            }
        });

        rx
    }
}
