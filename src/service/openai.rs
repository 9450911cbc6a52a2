//! OpenAI-compatible backend (llama-server and friends)
//!
//! Talks to `POST {host}/v1/chat/completions`. Streaming responses arrive
//! as SSE lines (`data: {...}`) terminated by `data: [DONE]`.

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;

use super::common::{generate_request_id, BackendError, ChatMessage, GenerationOptions};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<ChatDelta>,
}

#[derive(Debug, Deserialize)]
struct ChatDelta {
    content: Option<String>,
}

fn completions_url(config: &Config) -> String {
    let host = config.host.strip_suffix("/v1").unwrap_or(&config.host);
    format!("{}/v1/chat/completions", host)
}

async fn send_completion(
    client: &Client,
    config: &Config,
    messages: Vec<ChatMessage>,
    options: GenerationOptions,
    stream: bool,
) -> Result<reqwest::Response, BackendError> {
    let payload = ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        max_tokens: options.max_tokens,
        temperature: options.temperature,
        top_p: options.top_p,
        stop: options.stop,
        stream,
    };

    let url = completions_url(config);
    debug!("Calling chat completions API: {}", url);

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
    let response = send_completion(client, config, messages, options, false).await?;

    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Parse(e.to_string()))?;

    let parsed: ChatCompletionResponse =
        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))?;

    let text = parsed
        .choices
        .first()
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.as_deref())
        .map(|c| c.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(BackendError::Empty);
    }

    Ok(text)
}

/// Streaming generation over SSE; closing the channel is the end signal
pub async fn stream_generate(
    client: &Client,
    config: &Config,
    messages: Vec<ChatMessage>,
    options: GenerationOptions,
    tx: mpsc::Sender<Result<String, BackendError>>,
) -> Result<(), BackendError> {
    let response = send_completion(client, config, messages, options, true).await?;

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
            let mut line = buffer[..newline].trim().to_string();
            buffer.drain(..=newline);

            // SSE framing: strip the "data:" prefix, skip keep-alives
            if let Some(stripped) = line.strip_prefix("data:") {
                line = stripped.trim().to_string();
            }
            if line.is_empty() {
                continue;
            }
            if line == "[DONE]" {
                info!("Chat completions stream complete ({} fragments)", fragments);
                return Ok(());
            }

            match serde_json::from_str::<StreamChunk>(&line) {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .first()
                        .and_then(|c| c.delta.as_ref())
                        .and_then(|d| d.content.clone());
                    if let Some(content) = content {
                        if !content.is_empty() {
                            fragments += 1;
                            if tx.send(Ok(content)).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(BackendError::Parse(e.to_string()))).await;
                    return Ok(());
                }
            }
        }
    }

    // A final frame without a trailing newline still carries a fragment
    let mut line = buffer.trim().to_string();
    if let Some(stripped) = line.strip_prefix("data:") {
        line = stripped.trim().to_string();
    }
    if !line.is_empty() && line != "[DONE]" {
        match serde_json::from_str::<StreamChunk>(&line) {
            Ok(chunk) => {
                let content = chunk
                    .choices
                    .first()
                    .and_then(|c| c.delta.as_ref())
                    .and_then(|d| d.content.clone());
                if let Some(content) = content {
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

    info!("Chat completions stream ended ({} fragments)", fragments);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendKind, Config, ConfigOptions};

    #[test]
    fn test_completions_url() {
        let config = Config::new(
            "http://localhost:8080".to_string(),
            "llama3.2".to_string(),
            BackendKind::OpenAiCompat,
            ConfigOptions::default(),
        )
        .unwrap();
        assert_eq!(
            completions_url(&config),
            "http://localhost:8080/v1/chat/completions"
        );

        let config = Config::new(
            "http://localhost:8080/v1/".to_string(),
            "llama3.2".to_string(),
            BackendKind::OpenAiCompat,
            ConfigOptions::default(),
        )
        .unwrap();
        assert_eq!(
            completions_url(&config),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
