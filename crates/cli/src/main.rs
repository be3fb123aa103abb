//! SkillForge CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write a starter config file
//! - `run`      — Answer one query with the agent loop
//! - `match`    — Show relevance matches for a query
//! - `catalog`  — List loaded skill documents
//! - `status`   — Show effective configuration

use clap::{Parser, Subcommand};
use skillforge_core::query::ResearchMode;

mod commands;

#[derive(Parser)]
#[command(
    name = "skillforge",
    about = "SkillForge — skill-guided agent reasoning core",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init,

    /// Answer one query with the agent loop
    Run {
        /// The query to answer
        query: String,

        /// Session identifier, shared across related queries
        #[arg(short, long, default_value = "cli")]
        session: String,

        /// Research profile: standard, deep, academic, or technical
        #[arg(short, long, default_value = "standard")]
        research: String,

        /// Override the skill catalog directory
        #[arg(long)]
        catalog: Option<std::path::PathBuf>,

        /// Restrict the agent to these tools (repeatable)
        #[arg(short, long)]
        tool: Vec<String>,
    },

    /// Show relevance matches for a query without running the agent
    Match {
        /// The query to score against the catalog
        query: String,

        /// Category hint fed to the matcher
        #[arg(long)]
        hint: Option<String>,

        /// Override the skill catalog directory
        #[arg(long)]
        catalog: Option<std::path::PathBuf>,
    },

    /// List loaded skill documents
    Catalog {
        /// Override the skill catalog directory
        #[arg(long)]
        catalog: Option<std::path::PathBuf>,
    },

    /// Show effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Run {
            query,
            session,
            research,
            catalog,
            tool,
        } => {
            let research = research.parse::<ResearchMode>()?;
            commands::run::run(query, session, research, catalog, tool).await?;
        }
        Commands::Match {
            query,
            hint,
            catalog,
        } => commands::match_cmd::run(query, hint, catalog).await?,
        Commands::Catalog { catalog } => commands::catalog::run(catalog).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
