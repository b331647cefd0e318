//! `reagent gateway` — Start the WebSocket gateway server.

use reagent_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.port = port;
    }

    if !config.has_api_key() {
        return Err("No API key found. Set OPENAI_API_KEY and try again.".into());
    }

    println!("Reagent gateway");
    println!("   Listening: {}", config.bind_addr());
    println!("   Model:     {}", config.model);

    reagent_gateway::start(config).await?;

    Ok(())
}
