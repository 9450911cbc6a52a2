//! Ollama chat API backend
//!
//! Talks to `POST {host}/api/chat`. Streaming responses arrive as NDJSON:
//! one JSON object per line, the last carrying `"done": true`.

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;

use super::common::{generate_request_id, BackendError, ChatMessage, GenerationOptions};

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

impl From<GenerationOptions> for OllamaOptions {
    fn from(opts: GenerationOptions) -> Self {
        Self {
            temperature: opts.temperature,
            num_predict: opts.max_tokens,
            top_p: opts.top_p,
            stop: opts.stop,
        }
    }
}

/// One response object; both the single non-streaming reply and each
/// streamed NDJSON line use this shape
#[derive(Debug, Deserialize)]
struct OllamaChatChunk {
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
}

fn chat_url(config: &Config) -> String {
    format!("{}/api/chat", config.host)
}

async fn send_chat(
    client: &Client,
    config: &Config,
    messages: Vec<ChatMessage>,
    options: GenerationOptions,
    stream: bool,
) -> Result<reqwest::Response, BackendError> {
    let payload = OllamaChatRequest {
        model: config.model.clone(),
        messages,
        stream,
        options: options.into(),
    };

    let url = chat_url(config);
    debug!("Calling Ollama chat API: {}", url);

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("x-request-id", generate_request_id())
        .json(&payload)
        .send()
        .await
        .map_err(|e| BackendError::from_request(&config.host, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::from_status(
            status.as_u16(),
            body,
            &config.model,
        ));
    }

    Ok(response)
}

/// One-shot generation
pub async fn generate(
    client: &Client,
    config: &Config,
    messages: Vec<ChatMessage>,
    options: GenerationOptions,
) -> Result<String, BackendError> {
    let response = send_chat(client, config, messages, options, false).await?;

    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Parse(e.to_string()))?;

    let chunk: OllamaChatChunk =
        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))?;

    if let Some(error) = chunk.error {
        return Err(BackendError::Api {
            status: 200,
            body: error,
        });
    }

    let text = chunk
        .message
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(BackendError::Empty);
    }

    Ok(text)
}

/// Streaming generation: forwards each content fragment into the channel;
/// closing the channel is the end signal
pub async fn stream_generate(
    client: &Client,
    config: &Config,
    messages: Vec<ChatMessage>,
    options: GenerationOptions,
    tx: mpsc::Sender<Result<String, BackendError>>,
) -> Result<(), BackendError> {
    let response = send_chat(client, config, messages, options, true).await?;

    let mut byte_stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut fragments = 0usize;

    while let Some(item) = byte_stream.next().await {
        let bytes = match item {
            Ok(b) => b,
            Err(e) => {
                let _ = tx.send(Err(BackendError::Parse(e.to_string()))).await;
                return Ok(());
            }
        };

        buffer.push_str(&String::from_utf8_lossy(&bytes));

        while let Some(newline) = buffer.find('\n') {
            let line = buffer[..newline].trim().to_string();
            buffer.drain(..=newline);

            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<OllamaChatChunk>(&line) {
                Ok(chunk) => {
                    if let Some(error) = chunk.error {
                        let _ = tx
                            .send(Err(BackendError::Api {
                                status: 200,
                                body: error,
                            }))
                            .await;
                        return Ok(());
                    }
                    if let Some(content) = chunk.message.and_then(|m| m.content) {
                        if !content.is_empty() {
                            fragments += 1;
                            if tx.send(Ok(content)).await.is_err() {
                                // receiver dropped, stop reading
                                return Ok(());
                            }
                        }
                    }
                    if chunk.done {
                        info!("Ollama stream complete ({} fragments)", fragments);
                        return Ok(());
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(BackendError::Parse(e.to_string()))).await;
                    return Ok(());
                }
            }
        }
    }

    // A final object without a trailing newline still carries a fragment
    let line = buffer.trim();
    if !line.is_empty() {
        match serde_json::from_str::<OllamaChatChunk>(line) {
            Ok(chunk) => {
                if let Some(error) = chunk.error {
                    let _ = tx
                        .send(Err(BackendError::Api {
                            status: 200,
                            body: error,
                        }))
                        .await;
                    return Ok(());
                }
                if let Some(content) = chunk.message.and_then(|m| m.content) {
                    if !content.is_empty() {
                        fragments += 1;
                        let _ = tx.send(Ok(content)).await;
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(Err(BackendError::Parse(e.to_string()))).await;
                return Ok(());
            }
        }
    }

    info!("Ollama stream ended ({} fragments)", fragments);
    Ok(())
}
