//! Chat Server - HTTP server for the web chat UI
//!
//! Serves the single-page chat interface and relays streamed model output
//! as server-sent events.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full, Limited, StreamBody};
use hyper::body::{Bytes, Frame, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::enhancer::{PromptEnhancer, TaskTemplate};
use crate::service::ModelClient;

use super::templates::CHAT_UI_HTML;

/// Maximum request body size (1MB)
const MAX_BODY_SIZE: usize = 1024 * 1024;

type ChatBody = BoxBody<Bytes, Infallible>;

/// Shared per-request state
struct ServerState {
    config: Arc<Config>,
    client: ModelClient,
    enhancer: PromptEnhancer,
}

/// Web chat HTTP server
pub struct ChatServer {
    state: Arc<ServerState>,
    start_port: u16,
}

impl ChatServer {
    pub fn new(config: Arc<Config>, client: ModelClient, start_port: u16) -> Self {
        Self {
            state: Arc::new(ServerState {
                config,
                client,
                enhancer: PromptEnhancer::new(),
            }),
            start_port,
        }
    }

    /// Bind and serve until the process exits
    pub async fn run(&self, open_browser: bool) -> Result<()> {
        let mut port = self.start_port;
        let mut listener: Option<TcpListener> = None;

        // Try to bind to port, increment if in use
        for _ in 0..100 {
            match TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await {
                Ok(l) => {
                    listener = Some(l);
                    break;
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("Port {} is in use, trying {}", port, port + 1);
                        port += 1;
                    } else {
                        return Err(anyhow!("Failed to bind to port: {}", e));
                    }
                }
            }
        }

        let listener = listener.ok_or_else(|| anyhow!("Could not find available port"))?;

        let url = format!("http://localhost:{}", port);
        info!("Chat server started: {}", url);
        println!("Open your browser to: {}", url);

        if open_browser {
            if let Err(e) = open::that(&url) {
                warn!("Could not auto-open browser: {}, URL: {}", e, url);
            }
        }

        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let state = self.state.clone();

            tokio::spawn(async move {
                let service = service_fn(|req| {
                    let state = state.clone();
                    async move { handle_request(req, state).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    if !e.to_string().contains("connection closed") {
                        error!("Error serving connection: {}", e);
                    }
                }
            });
        }
    }
}

/// Handle HTTP request
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
) -> Result<Response<ChatBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (method, path.as_str()) {
        (Method::GET, "/") => serve_chat_ui(),
        (Method::GET, "/api/health") => health_response(&state),
        (Method::POST, "/api/chat") => handle_chat(req, state).await,
        (Method::POST, path) if path.starts_with("/api/commands/") => {
            let command = path.trim_start_matches("/api/commands/").to_string();
            handle_command(req, state, &command).await
        }
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "text/plain")
            .body(full_body("Not Found"))
            .unwrap(),
    };

    Ok(response)
}

/// Serve the chat UI HTML
fn serve_chat_ui() -> Response<ChatBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(full_body(CHAT_UI_HTML))
        .unwrap()
}

/// Report service health and active model
fn health_response(state: &ServerState) -> Response<ChatBody> {
    let body = json!({
        "status": "healthy",
        "model": state.config.model,
        "host": state.config.host,
    });
    json_response(StatusCode::OK, &body.to_string())
}

/// Handle a chat message with streaming response
async fn handle_chat(req: Request<Incoming>, state: Arc<ServerState>) -> Response<ChatBody> {
    let body = match read_body_with_limit(req, MAX_BODY_SIZE).await {
        Ok(b) => b,
        Err(e) => {
            return json_error_response(StatusCode::BAD_REQUEST, &e);
        }
    };

    #[derive(Deserialize)]
    struct ChatRequest {
        #[serde(default)]
        message: String,
    }

    let chat: ChatRequest = match serde_json::from_slice(&body) {
        Ok(c) => c,
        Err(_) => {
            return json_error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    if chat.message.is_empty() {
        return json_error_response(StatusCode::BAD_REQUEST, "No message provided");
    }

    let prompt = state.enhancer.enhance(&chat.message);
    sse_response(state, prompt)
}

/// Handle the canned commands (explain, fix, optimize)
async fn handle_command(
    req: Request<Incoming>,
    state: Arc<ServerState>,
    command: &str,
) -> Response<ChatBody> {
    let template = match TaskTemplate::from_name(command) {
        Some(t) => t,
        None => {
            return json_error_response(
                StatusCode::BAD_REQUEST,
                &format!("Unknown command: {}", command),
            );
        }
    };

    let body = match read_body_with_limit(req, MAX_BODY_SIZE).await {
        Ok(b) => b,
        Err(e) => {
            return json_error_response(StatusCode::BAD_REQUEST, &e);
        }
    };

    #[derive(Deserialize)]
    struct CommandRequest {
        #[serde(default)]
        code: String,
    }

    let cmd: CommandRequest = match serde_json::from_slice(&body) {
        Ok(c) => c,
        Err(_) => {
            return json_error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    if cmd.code.is_empty() {
        return json_error_response(StatusCode::BAD_REQUEST, "No code provided");
    }

    let prompt = state.enhancer.enhance(&template.render(&cmd.code));
    sse_response(state, prompt)
}

/// Stream model output as server-sent events: one `content` event per
/// fragment, then `done`; a failure becomes a terminal `error` event.
fn sse_response(state: Arc<ServerState>, prompt: String) -> Response<ChatBody> {
    let (tx, rx) = mpsc::channel::<Bytes>(64);

    tokio::spawn(async move {
        let mut chunks = state.client.stream_generate(&prompt);
        let mut failed = false;

        while let Some(item) = chunks.recv().await {
            match item {
                Ok(text) => {
                    if tx.send(sse_event(&json!({"content": text}))).await.is_err() {
                        // client went away
                        return;
                    }
                }
                Err(e) => {
                    error!("Streaming failed: {}", e);
                    let _ = tx.send(sse_event(&json!({"error": e.to_string()}))).await;
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            let _ = tx.send(sse_event(&json!({"done": true}))).await;
        }
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|bytes| (Ok::<_, Infallible>(Frame::data(bytes)), rx))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .body(BodyExt::boxed(StreamBody::new(stream)))
        .unwrap()
}

/// Format one SSE event
fn sse_event(payload: &serde_json::Value) -> Bytes {
    Bytes::from(format!("data: {}\n\n", payload))
}

/// Read request body with size limit
async fn read_body_with_limit(req: Request<Incoming>, max_size: usize) -> Result<Bytes, String> {
    let limited = Limited::new(req.into_body(), max_size);
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            let err_str = e.to_string();
            if err_str.contains("length limit exceeded") {
                Err(format!("Request body too large (max {} bytes)", max_size))
            } else {
                Err("Failed to read body".to_string())
            }
        }
    }
}

/// Create JSON error response
fn json_error_response(status: StatusCode, error: &str) -> Response<ChatBody> {
    json_response(status, &json!({"error": error}).to_string())
}

/// Create JSON response
fn json_response(status: StatusCode, body: &str) -> Response<ChatBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full_body(body.to_string()))
        .unwrap()
}

fn full_body(data: impl Into<Bytes>) -> ChatBody {
    BodyExt::boxed(Full::new(data.into()))
}
