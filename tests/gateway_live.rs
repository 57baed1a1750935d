use std::env;

use dotenvy::dotenv;
use gitclaw_llm::{Gateway, GatewayConfig, PromptSource, Provider, TemplateContext};

fn load_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn build_gateway(provider: Provider) -> Option<Gateway> {
    if load_env_var(provider.credential_env_var()).is_none() {
        eprintln!(
            "skip live test: {} missing",
            provider.credential_env_var()
        );
        return None;
    }
    let config = GatewayConfig::from_env().expect("config from env");
    Some(Gateway::builder(config).build().expect("gateway"))
}

#[tokio::test]
#[ignore = "requires valid Anthropic credentials"]
async fn anthropic_live_text_generation() {
    dotenv().ok();
    let Some(gateway) = build_gateway(Provider::Anthropic) else {
        return;
    };
    let model =
        load_env_var("ANTHROPIC_MODEL").unwrap_or_else(|| "claude-haiku-4-5-20251001".to_string());

    let text = gateway
        .invoke(
            Provider::Anthropic,
            &model,
            &PromptSource::from("You answer with a single word."),
            "Reply with the word: pong",
            Some(16),
        )
        .await
        .expect("Anthropic request should succeed");

    assert!(
        text.to_ascii_lowercase().contains("pong"),
        "unexpected reply: {text}"
    );
}

#[tokio::test]
#[ignore = "requires valid OpenAI credentials"]
async fn openai_live_context_generation() {
    dotenv().ok();
    let Some(gateway) = build_gateway(Provider::OpenAi) else {
        return;
    };
    let model = load_env_var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
    let context = TemplateContext::new()
        .with("word", "pong")
        .with("user_message", "Say the word now.");

    let text = gateway
        .invoke_with_context(
            Provider::OpenAi,
            &model,
            &PromptSource::from("You only ever say the word {{word}}."),
            &context,
            Some(16),
        )
        .await
        .expect("OpenAI request should succeed");

    assert!(
        text.to_ascii_lowercase().contains("pong"),
        "unexpected reply: {text}"
    );
}
