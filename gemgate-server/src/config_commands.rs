use anyhow::Result;
use colored::Colorize;

use gemgate_core::modules::config as core_config;

pub fn show_config(json: bool) -> Result<()> {
    let config = core_config::load_config()?.redacted();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Server:".cyan().bold());
    println!("  Listen: {}", config.server.bind_address());
    println!("  Pages: {}", config.server.static_dir);

    println!("{}", "Site gate:".cyan().bold());
    if config.gate.is_enabled() {
        println!("  Enabled (cookie '{}', {}s)", config.gate.cookie_name, config.gate.max_age_secs);
    } else {
        println!("  {}", "Disabled (no SITE_PASSWORD)".yellow());
    }

    println!("{}", "Gateway:".cyan().bold());
    println!("  Upstream: {}", config.gateway.base_url);
    println!("  API key: {}", config.gateway.api_key.as_deref().unwrap_or("(caller supplied)"));
    println!("  Chat model: {}", config.gateway.chat_model);
    println!("  Image model: {}", config.gateway.image_model);
    println!(
        "  Batch limits: {} variations, {} calls",
        config.gateway.max_variations, config.gateway.max_batch_calls
    );
    Ok(())
}
