//! `skillforge catalog` — List loaded skill documents.

use std::path::PathBuf;

use skillforge_config::AppConfig;

pub async fn run(catalog_flag: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let dir = super::catalog_dir(&config, catalog_flag);
    let catalog = super::load_catalog(&dir)?;

    println!("Skill catalog ({}, {} documents)", dir.display(), catalog.len());
    let mut docs: Vec<_> = catalog.iter().collect();
    docs.sort_by(|a, b| a.tool_name.cmp(&b.tool_name));
    for doc in docs {
        println!(
            "  {:<20}  v{:<4}  prio {:<2}  [{}]  {}",
            doc.tool_name, doc.version, doc.priority, doc.category, doc.description
        );
        if !doc.referenced_documents.is_empty() {
            println!("  {:<20}  references: {}", "", doc.referenced_documents.join(", "));
        }
    }

    Ok(())
}
