//! `skillforge status` — Show effective configuration.

use skillforge_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("⚒️  SkillForge Status");
    println!("====================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  API URL:       {}", config.api_url);
    println!("  API key:       {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Model:         {}", config.model);
    println!("  Temperature:   {}", config.temperature);
    println!("  Tool service:  {}", config.adapter.tool_url);
    println!("  Catalog dir:   {}", config.skills.catalog_dir.display());
    println!("  Iterations:    {}", config.agent.max_iterations);
    println!(
        "  Knowledge:     {} chars, cache {}",
        config.skills.knowledge_budget_chars,
        if config.skills.cache_enabled { "enabled" } else { "disabled" }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `skillforge init` first");
    }

    Ok(())
}
