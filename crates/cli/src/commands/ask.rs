//! `reagent ask` — Run one question in-process.
//!
//! Uses the local tool registry, so there is no remote code executor;
//! the chain streams straight to stdout.

use reagent_agent::AgentLoop;
use reagent_config::AppConfig;
use reagent_provider::{CompletionBackend, OpenAiClient};
use reagent_tools::local_registry;
use std::io::Write;
use std::sync::Arc;

pub async fn run(question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env().map_err(|e| format!("Failed to load config: {e}"))?;
    let api_key = config
        .require_api_key()
        .map_err(|_| "No API key found. Set OPENAI_API_KEY and try again.")?;

    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiClient::new(
        "openai",
        &config.base_url,
        api_key,
        &config.model,
    )?);
    let agent = AgentLoop::new(backend, Arc::new(local_registry()));

    let mut stdout = std::io::stdout();
    let result = agent
        .run(question, |token| {
            let _ = write!(stdout, "{token}");
            let _ = stdout.flush();
        })
        .await;

    println!();
    match result {
        Ok(Some(answer)) => {
            println!("Answer: {answer}");
            Ok(())
        }
        Ok(None) => {
            println!("The chain ended without an answer.");
            Ok(())
        }
        Err(e) => Err(e.to_string().into()),
    }
}
