//! `skillforge init` — Write a starter config file.

use skillforge_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("⚒️  SkillForge — First-Time Setup");
    println!("================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  Config file already exists: {}", config_path.display());
        println!("  Leaving it untouched.");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config file: {}", config_path.display());
    }

    let skills_dir = config_dir.join("skills");
    if !skills_dir.exists() {
        std::fs::create_dir_all(&skills_dir)?;
        println!("✅ Created skill catalog directory: {}", skills_dir.display());
    }

    println!("\nNext steps:");
    println!("  1. Put your API key in the environment: SKILLFORGE_API_KEY=sk-...");
    println!("  2. Drop skill documents (*.md) into {}", skills_dir.display());
    println!("  3. skillforge run \"your first query\"");

    Ok(())
}
