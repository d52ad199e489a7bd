use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod code_runner;
mod commands;
mod highlight;
mod repl;
mod tagger;

#[derive(Parser)]
#[command(name = "mentor")]
#[command(about = "Mentor - a terminal Python learning assistant", long_about = None)]
struct Cli {
    /// Base directory for configuration and saved sessions (default: ~/.mentor)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Clock offset label (e.g. UTC, Asia/Shanghai); overrides the configured one
    #[arg(long)]
    timezone: Option<String>,

    /// Saved session to restore before the first prompt
    #[arg(long)]
    load: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => mentor_infrastructure::paths::default_base_dir()?,
    };

    let mut config = mentor_infrastructure::load_config(&base_dir);
    if cli.timezone.is_some() {
        config.timezone = cli.timezone;
    }

    let api_keys = mentor_infrastructure::ApiKeyStore::new(&base_dir);
    let Some(api_key) = api_keys.get("moonshot")? else {
        eprintln!("{}", "No Moonshot API key found.".red());
        eprintln!("Set the MOONSHOT_API_KEY environment variable, or fill in");
        eprintln!("  {}", api_keys.api_keys_file().display());
        if let Ok(true) = api_keys.create_example_config() {
            eprintln!("{}", "(an empty key file template was created)".bright_black());
        }
        anyhow::bail!("no API key configured");
    };

    let provider = mentor_interaction::MoonshotProvider::new(api_key, &config)?;
    let repository = mentor_infrastructure::JsonSessionRepository::new(&base_dir)?;

    let mut repl = repl::Repl::new(config, Box::new(provider), Box::new(repository), api_keys)?;
    if let Some(source) = cli.load {
        repl.load_session(&source).await;
    }
    repl.run().await
}
