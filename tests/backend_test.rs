//! Tests for the model runtime backends
//! Uses wiremock to mock HTTP responses

use stata_llama::config::{BackendKind, Config, ConfigOptions};
use stata_llama::service::{BackendError, ModelClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn make_client(host: &str, backend: BackendKind) -> ModelClient {
    let config = Config::new(
        host.to_string(),
        "llama3.2".to_string(),
        backend,
        ConfigOptions {
            request_timeout_secs: Some(10),
            ..ConfigOptions::default()
        },
    )
    .unwrap();
    ModelClient::new(config).unwrap()
}

async fn collect_stream(client: &ModelClient, prompt: &str) -> Vec<Result<String, BackendError>> {
    let mut rx = client.stream_generate(prompt);
    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

// ============================================================================
// Ollama backend
// ============================================================================

#[tokio::test]
async fn test_ollama_generate_success() {
    let mock_server = MockServer::start().await;

    let response_body = serde_json::json!({
        "model": "llama3.2",
        "message": {
            "role": "assistant",
            "content": "The regress command fits a linear regression.  "
        },
        "done": true
    });

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama3.2",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let result = client.generate("What does regress do?").await.unwrap();

    // Surrounding whitespace is trimmed
    assert_eq!(result, "The regress command fits a linear regression.");
}

#[tokio::test]
async fn test_ollama_sends_system_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system", "content": "You are a Stata expert."},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"role": "assistant", "content": "hi"},
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config::new(
        mock_server.uri(),
        "llama3.2".to_string(),
        BackendKind::Ollama,
        ConfigOptions {
            system_message: Some("You are a Stata expert.".to_string()),
            ..ConfigOptions::default()
        },
    )
    .unwrap();
    let client = ModelClient::new(config).unwrap();

    assert_eq!(client.generate("hello").await.unwrap(), "hi");
}

#[tokio::test]
async fn test_ollama_model_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "model 'llama3.2' not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, BackendError::ModelNotFound { ref model } if model == "llama3.2"));
}

#[tokio::test]
async fn test_ollama_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, BackendError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_ollama_inline_error_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"error": "model requires more memory"})),
        )
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let err = client.generate("hello").await.unwrap_err();

    assert!(
        matches!(err, BackendError::Api { ref body, .. } if body == "model requires more memory")
    );
}

#[tokio::test]
async fn test_ollama_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"role": "assistant", "content": "   "},
            "done": true
        })))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, BackendError::Empty));
}

#[tokio::test]
async fn test_ollama_unreachable_host() {
    // Port 9 (discard) is not listening
    let client = make_client("http://127.0.0.1:9", BackendKind::Ollama);
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, BackendError::Unreachable { .. }));
}

#[tokio::test]
async fn test_ollama_streaming() {
    let mock_server = MockServer::start().await;

    let ndjson = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"The \"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"regress \"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"command\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let items = collect_stream(&client, "What does regress do?").await;

    let text: String = items.into_iter().map(|i| i.unwrap()).collect();
    assert_eq!(text, "The regress command");
}

#[tokio::test]
async fn test_ollama_streaming_final_line_without_newline() {
    let mock_server = MockServer::start().await;

    // Last object is not newline-terminated; its fragment must not be lost
    let ndjson = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"The \"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"end\"},\"done\":true}",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let items = collect_stream(&client, "hello").await;

    let text: String = items.into_iter().map(|i| i.unwrap()).collect();
    assert_eq!(text, "The end");
}

#[tokio::test]
async fn test_ollama_streaming_error_mid_stream() {
    let mock_server = MockServer::start().await;

    let ndjson = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"partial\"},\"done\":false}\n",
        "{\"error\":\"runtime crashed\"}\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let items = collect_stream(&client, "hello").await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "partial");
    assert!(items[1].is_err());
}

#[tokio::test]
async fn test_ollama_streaming_request_failure_arrives_on_channel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such model"))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::Ollama);
    let items = collect_stream(&client, "hello").await;

    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0].as_ref().unwrap_err(),
        BackendError::ModelNotFound { .. }
    ));
}

// ============================================================================
// OpenAI-compatible backend
// ============================================================================

#[tokio::test]
async fn test_openai_generate_success() {
    let mock_server = MockServer::start().await;

    let response_body = serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": "summarize reports statistics."},
                "finish_reason": "stop"
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama3.2",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::OpenAiCompat);
    let result = client.generate("What does summarize do?").await.unwrap();

    assert_eq!(result, "summarize reports statistics.");
}

#[tokio::test]
async fn test_openai_model_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::OpenAiCompat);
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, BackendError::ModelNotFound { .. }));
}

#[tokio::test]
async fn test_openai_empty_choices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::OpenAiCompat);
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, BackendError::Empty));
}

#[tokio::test]
async fn test_openai_streaming() {
    let mock_server = MockServer::start().await;

    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::OpenAiCompat);
    let items = collect_stream(&client, "hello").await;

    let text: String = items.into_iter().map(|i| i.unwrap()).collect();
    assert_eq!(text, "Hello world");
}

#[tokio::test]
async fn test_openai_streaming_final_frame_without_newline() {
    let mock_server = MockServer::start().await;

    // Last data frame is not newline-terminated; its fragment must not be lost
    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}",
    );

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server.uri(), BackendKind::OpenAiCompat);
    let items = collect_stream(&client, "hello").await;

    let text: String = items.into_iter().map(|i| i.unwrap()).collect();
    assert_eq!(text, "Hello world");
}

#[tokio::test]
async fn test_openai_host_with_v1_suffix_not_doubled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let host = format!("{}/v1", mock_server.uri());
    let client = make_client(&host, BackendKind::OpenAiCompat);

    assert_eq!(client.generate("hello").await.unwrap(), "ok");
}
