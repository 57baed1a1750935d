use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use gitclaw_llm::http::{HttpRequest, HttpResponse, HttpTransport};
use gitclaw_llm::{
    Gateway, GatewayConfig, LLMError, PromptSource, Provider, TemplateContext,
};
use serde_json::{Value, json};

/// Serves one canned vendor response and counts network calls.
struct FixtureTransport {
    status: u16,
    body: &'static str,
    calls: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    urls: Mutex<Vec<String>>,
}

impl FixtureTransport {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_body(&self) -> Value {
        self.bodies.lock().unwrap().last().cloned().expect("no body")
    }

    fn last_url(&self) -> String {
        self.urls.lock().unwrap().last().cloned().expect("no url")
    }
}

#[async_trait]
impl HttpTransport for FixtureTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = request.body.unwrap_or_default();
        self.bodies
            .lock()
            .unwrap()
            .push(serde_json::from_slice(&body).expect("request body should be JSON"));
        self.urls.lock().unwrap().push(request.url);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }
}

fn config(keys: &[(&'static str, &'static str)]) -> GatewayConfig {
    let keys: HashMap<&str, &str> = keys.iter().copied().collect();
    GatewayConfig::from_lookup(|key| keys.get(key).map(|value| value.to_string()))
        .expect("config")
}

fn both_keys() -> GatewayConfig {
    config(&[("ANTHROPIC_API_KEY", "sk-ant"), ("OPENAI_API_KEY", "sk-oai")])
}

#[tokio::test]
async fn openai_fixture_yields_exact_text() {
    let transport = FixtureTransport::new(200, r#"{"choices":[{"message":{"content":"Hi!"}}]}"#);
    let gateway = Gateway::new(both_keys(), transport.clone());

    let text = gateway
        .invoke(
            Provider::OpenAi,
            "gpt-4o",
            &PromptSource::from("You are terse."),
            "Say hi",
            Some(16),
        )
        .await
        .expect("invoke");

    assert_eq!(text, "Hi!");
    assert_eq!(transport.calls(), 1);
    assert_eq!(
        transport.last_url(),
        "https://api.openai.com/v1/chat/completions"
    );
}

#[tokio::test]
async fn anthropic_fixture_yields_first_content_text() {
    let transport = FixtureTransport::new(
        200,
        r#"{"id":"msg_1","type":"message","role":"assistant","model":"claude-haiku-4-5-20251001",
            "content":[{"type":"text","text":"A refactor saved is a refactor earned."}],
            "stop_reason":"end_turn","usage":{"input_tokens":40,"output_tokens":9}}"#,
    );
    let gateway = Gateway::new(both_keys(), transport.clone());

    let text = gateway
        .invoke(
            Provider::Anthropic,
            "claude-haiku-4-5-20251001",
            &PromptSource::from("You are a fortune cookie."),
            "Generate today's fortune.",
            Some(800),
        )
        .await
        .expect("invoke");

    assert_eq!(text, "A refactor saved is a refactor earned.");
    assert_eq!(transport.last_url(), "https://api.anthropic.com/v1/messages");
    assert_eq!(transport.last_body()["system"], json!("You are a fortune cookie."));
}

#[tokio::test]
async fn degenerate_success_is_an_empty_string() {
    let transport = FixtureTransport::new(200, r#"{"content":[]}"#);
    let gateway = Gateway::new(both_keys(), transport.clone());

    let text = gateway
        .invoke(
            Provider::Anthropic,
            "claude-sonnet-4-5",
            &PromptSource::from("sys"),
            "hi",
            None,
        )
        .await
        .expect("empty generation is not an error");

    assert_eq!(text, "");
}

#[tokio::test]
async fn vendor_failure_surfaces_raw_body_without_retry() {
    let body = r#"{"error":{"message":"The server had an error while processing your request."}}"#;
    let transport = FixtureTransport::new(500, body);
    let gateway = Gateway::new(both_keys(), transport.clone());

    let err = gateway
        .invoke(
            Provider::OpenAi,
            "gpt-4o",
            &PromptSource::from("sys"),
            "hi",
            None,
        )
        .await
        .expect_err("500 must fail");

    match err {
        LLMError::Vendor {
            provider,
            status,
            body: raw,
        } => {
            assert_eq!(provider, "openai");
            assert_eq!(status, 500);
            assert_eq!(raw, body);
        }
        other => panic!("unexpected error type: {other:?}"),
    }
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn missing_credential_makes_no_network_call() {
    let transport = FixtureTransport::new(200, "{}");
    let gateway = Gateway::new(config(&[]), transport.clone());

    for provider in Provider::ALL {
        let err = gateway
            .invoke(provider, "any-model", &PromptSource::from("sys"), "hi", None)
            .await
            .expect_err("no credentials configured");
        assert!(
            matches!(err, LLMError::MissingCredential { .. }),
            "unexpected error for {provider}: {err:?}"
        );
        assert!(err.is_configuration());
    }
    assert_eq!(transport.calls(), 0);
}

#[test]
fn unknown_provider_is_a_configuration_error() {
    let err = "cohere".parse::<Provider>().expect_err("cohere is unsupported");
    assert!(matches!(err, LLMError::UnknownProvider { ref name } if name == "cohere"));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn file_system_prompt_is_read_before_dispatch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("code-jester.md");
    fs::write(&path, "You are the Code Jester.").expect("write prompt");

    let transport = FixtureTransport::new(200, r#"{"choices":[{"message":{"content":"🃏"}}]}"#);
    let gateway = Gateway::new(both_keys(), transport.clone());

    let prompt = PromptSource::from_arg(path.to_str().expect("utf-8 path"));
    assert_eq!(prompt, PromptSource::File(path.clone()));

    let text = gateway
        .invoke(Provider::OpenAi, "gpt-4o", &prompt, "Review PR #7", Some(2000))
        .await
        .expect("invoke");

    assert_eq!(text, "🃏");
    assert_eq!(
        transport.last_body()["messages"][0],
        json!({"role": "system", "content": "You are the Code Jester."})
    );
}

#[tokio::test]
async fn persona_prompt_is_rendered_with_context() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("quest-master.md"),
        "Quest #{{issue_number}}: {{issue_title}}\nReward: {{xp}} XP\n{{optional_lore}}",
    )
    .expect("write prompt");

    let mut config = both_keys();
    config.prompt_dir = dir.path().to_path_buf();
    let transport = FixtureTransport::new(200, r#"{"content":[{"type":"text","text":"Accepted."}]}"#);
    let gateway = Gateway::new(config, transport.clone());

    let context = TemplateContext::new()
        .with("issue_number", "42")
        .with("issue_title", "Slay the {{dragon}}")
        .with("xp", "150");

    let text = gateway
        .invoke_persona(Provider::Anthropic, "claude-sonnet-4-5", "quest-master", &context, Some(1500))
        .await
        .expect("invoke");

    assert_eq!(text, "Accepted.");
    let body = transport.last_body();
    assert_eq!(
        body["system"],
        json!("Quest #42: Slay the {{dragon}}\nReward: 150 XP\n{{optional_lore}}")
    );
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": "Execute your task."}])
    );
    assert_eq!(body["max_tokens"], json!(1500));
}

#[tokio::test]
async fn missing_persona_file_aborts_before_network() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = both_keys();
    config.prompt_dir = dir.path().to_path_buf();
    let transport = FixtureTransport::new(200, "{}");
    let gateway = Gateway::new(config, transport.clone());

    let err = gateway
        .invoke_persona(
            Provider::OpenAi,
            "gpt-4o",
            "morning-roast",
            &TemplateContext::new(),
            None,
        )
        .await
        .expect_err("no prompt file");

    match err {
        LLMError::PromptSourceMissing { path, .. } => {
            assert_eq!(path, dir.path().join("morning-roast.md"));
        }
        other => panic!("unexpected error type: {other:?}"),
    }
    assert_eq!(transport.calls(), 0);
}
