//! Tests for configuration resolution and normalization

use stata_llama::config::{
    BackendKind, Config, ConfigOptions, DEFAULT_HOST, DEFAULT_MODEL, ENV_HOST, ENV_MODEL,
};

fn new_config(host: &str, model: &str) -> anyhow::Result<std::sync::Arc<Config>> {
    Config::new(
        host.to_string(),
        model.to_string(),
        BackendKind::Ollama,
        ConfigOptions::default(),
    )
}

#[test]
fn test_defaults_applied() {
    let config = new_config("http://localhost:11434", "llama3.2").unwrap();
    assert_eq!(config.temperature, 0.7);
    assert_eq!(config.max_tokens, 2048);
    assert_eq!(config.top_p, 0.9);
    assert!(config.stop.is_empty());
    assert!(config.system_message.is_empty());
    assert_eq!(config.request_timeout_secs, 120);
    assert_eq!(config.backend, BackendKind::Ollama);
}

#[test]
fn test_options_override_defaults() {
    let config = Config::new(
        "http://localhost:11434".to_string(),
        "llama3.2".to_string(),
        BackendKind::OpenAiCompat,
        ConfigOptions {
            temperature: Some(0.2),
            max_tokens: Some(512),
            top_p: Some(0.95),
            stop: vec!["###".to_string()],
            system_message: Some("Be terse.".to_string()),
            request_timeout_secs: Some(30),
        },
    )
    .unwrap();

    assert_eq!(config.temperature, 0.2);
    assert_eq!(config.max_tokens, 512);
    assert_eq!(config.top_p, 0.95);
    assert_eq!(config.stop, vec!["###".to_string()]);
    assert_eq!(config.system_message, "Be terse.");
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.backend, BackendKind::OpenAiCompat);
}

#[test]
fn test_host_scheme_defaulted() {
    let config = new_config("localhost:11434", "llama3.2").unwrap();
    assert_eq!(config.host, "http://localhost:11434");
}

#[test]
fn test_https_scheme_preserved() {
    let config = new_config("https://runtime.example.com", "llama3.2").unwrap();
    assert_eq!(config.host, "https://runtime.example.com");
}

#[test]
fn test_trailing_slash_stripped() {
    let config = new_config("http://localhost:11434/", "llama3.2").unwrap();
    assert_eq!(config.host, "http://localhost:11434");
}

#[test]
fn test_model_trimmed() {
    let config = new_config("http://localhost:11434", "  llama3.2  ").unwrap();
    assert_eq!(config.model, "llama3.2");
}

#[test]
fn test_empty_host_rejected() {
    assert!(new_config("", "llama3.2").is_err());
    assert!(new_config("   ", "llama3.2").is_err());
}

#[test]
fn test_empty_model_rejected() {
    assert!(new_config("http://localhost:11434", "").is_err());
    assert!(new_config("http://localhost:11434", "   ").is_err());
}

#[test]
fn test_cli_values_win_resolution() {
    assert_eq!(
        Config::resolve_host(Some("http://other:1234".to_string())),
        "http://other:1234"
    );
    assert_eq!(Config::resolve_model(Some("phi3".to_string())), "phi3");
}

// Environment resolution is covered in one test because env vars are
// process-global and integration tests run on multiple threads.
#[test]
fn test_env_and_default_resolution() {
    std::env::remove_var(ENV_HOST);
    std::env::remove_var(ENV_MODEL);
    assert_eq!(Config::resolve_host(None), DEFAULT_HOST);
    assert_eq!(Config::resolve_model(None), DEFAULT_MODEL);

    std::env::set_var(ENV_HOST, "http://envhost:9999");
    std::env::set_var(ENV_MODEL, "env-model");
    assert_eq!(Config::resolve_host(None), "http://envhost:9999");
    assert_eq!(Config::resolve_model(None), "env-model");

    // CLI still wins over the environment
    assert_eq!(
        Config::resolve_host(Some("http://cli:1".to_string())),
        "http://cli:1"
    );
    assert_eq!(Config::resolve_model(Some("cli-model".to_string())), "cli-model");

    // Blank env values fall through to the defaults
    std::env::set_var(ENV_HOST, "  ");
    std::env::set_var(ENV_MODEL, "");
    assert_eq!(Config::resolve_host(None), DEFAULT_HOST);
    assert_eq!(Config::resolve_model(None), DEFAULT_MODEL);

    std::env::remove_var(ENV_HOST);
    std::env::remove_var(ENV_MODEL);
}

#[test]
fn test_backend_display_names() {
    assert_eq!(BackendKind::Ollama.to_string(), "ollama");
    assert_eq!(BackendKind::OpenAiCompat.to_string(), "openai-compat");
}
