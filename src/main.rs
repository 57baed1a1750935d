//! Command-line entry point: one invocation, text on stdout, diagnostics on stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitclaw_llm::types::USER_MESSAGE_KEY;
use gitclaw_llm::{Gateway, GatewayConfig, PromptSource, Provider, TemplateContext};

#[derive(Parser)]
#[command(
    name = "gitclaw-llm",
    version,
    about = "Invoke an LLM persona through the GitClaw gateway"
)]
struct Cli {
    /// Provider to call: anthropic or openai
    provider: String,

    /// Model identifier, e.g. claude-sonnet-4-5 or gpt-4o
    model: String,

    /// System prompt text, or the path of a file holding it
    system_prompt: String,

    /// User message sent after the system prompt
    user_message: String,

    /// Completion token budget (default: 2048 or GITCLAW_MAX_TOKENS)
    max_tokens: Option<u32>,

    /// Treat SYSTEM_PROMPT as a persona name looked up in the prompt directory
    #[arg(long)]
    persona: bool,

    /// JSON object whose entries fill {{key}} placeholders in the system prompt
    #[arg(long, value_name = "FILE")]
    context: Option<PathBuf>,

    /// Extra placeholder value; may be repeated
    #[arg(long = "set", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// JSON gateway configuration; environment variables fill the gaps
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let provider: Provider = cli.provider.parse()?;
    let config = load_config(cli.config.as_deref())?;
    let prompt = if cli.persona {
        config.prompt_library().source(&cli.system_prompt)?
    } else {
        PromptSource::from_arg(&cli.system_prompt)
    };
    let gateway = Gateway::builder(config).build()?;

    let text = match build_context(cli.context.as_deref(), &cli.vars, &cli.user_message)? {
        Some(context) => {
            gateway
                .invoke_with_context(provider, &cli.model, &prompt, &context, cli.max_tokens)
                .await?
        }
        None => {
            gateway
                .invoke(
                    provider,
                    &cli.model,
                    &prompt,
                    &cli.user_message,
                    cli.max_tokens,
                )
                .await?
        }
    };

    println!("{text}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GatewayConfig> {
    let config = match path {
        Some(path) => GatewayConfig::from_json_file(path)?
            .merge_lookup(|key| std::env::var(key).ok())?,
        None => GatewayConfig::from_env()?,
    };
    Ok(config)
}

/// Returns `None` unless a context file or `--set` values were given.
fn build_context(
    file: Option<&Path>,
    vars: &[String],
    user_message: &str,
) -> anyhow::Result<Option<TemplateContext>> {
    if file.is_none() && vars.is_empty() {
        return Ok(None);
    }

    let mut context = match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read context file {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("context file {} is not JSON", path.display()))?;
            TemplateContext::from_json(&value)?
        }
        None => TemplateContext::new(),
    };

    for var in vars {
        let (key, value) = parse_assignment(var)?;
        context.insert(key, value);
    }

    if !context.contains_key(USER_MESSAGE_KEY) {
        context.insert(USER_MESSAGE_KEY, user_message);
    }

    Ok(Some(context))
}

fn parse_assignment(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("invalid --set value `{raw}`: expected KEY=VALUE"),
    }
}
