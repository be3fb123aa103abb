//! `skillforge match` — Show relevance matches for a query.

use std::path::PathBuf;
use std::sync::Arc;

use skillforge_config::AppConfig;
use skillforge_core::query::QueryContext;
use skillforge_skills::SkillIndex;

pub async fn run(
    query: String,
    hint: Option<String>,
    catalog_flag: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let catalog = super::load_catalog(&super::catalog_dir(&config, catalog_flag))?;
    let index = SkillIndex::new(Arc::clone(&catalog));

    let mut ctx = QueryContext::new(query.clone(), "cli");
    if let Some(hint) = hint {
        ctx = ctx.with_category_hint(hint);
    }

    let matches = index.match_query(&ctx);
    if matches.is_empty() {
        println!("No skill documents matched '{query}'");
        return Ok(());
    }

    println!("Matches for '{query}':");
    for m in matches {
        println!("  {:.3}  {:<20}  {}", m.score, m.tool_name, m.document.description);
    }

    Ok(())
}
