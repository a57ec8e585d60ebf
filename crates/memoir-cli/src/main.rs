mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    // Wire the engine once (config, backends, pending queue, repository)
    let app = commands::AppContext::init().await?;

    match cli.command {
        cli::Commands::Story(story_cmd) => commands::story::handle(story_cmd, &app).await,
        cli::Commands::Purge { yes } => commands::story::purge(&app, yes).await,
        cli::Commands::Pending => commands::sync::pending(&app).await,
        cli::Commands::Sync => commands::sync::run(&app).await,
    }
}
