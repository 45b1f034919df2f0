use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use recaster::config::AppConfig;
use recaster::pipeline::Pipeline;
use std::env;

/// Republish Binance announcement channel posts as Twitter threads.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Build threads without posting tweets or saving state
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse the specified (or default) .env file
    let dotenv_path = env::var("RECASTER_DOTENV_PATH").unwrap_or_else(|_| ".env".to_string());
    let dotenv_result = dotenvy::from_path(&dotenv_path);

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match dotenv_result {
        Ok(()) => log::info!("Loaded env from {}", dotenv_path),
        Err(err) => log::debug!("No .env loaded from {}: {}", dotenv_path, err),
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Reading configuration")?;
    let pipeline = Pipeline::new(config, cli.dry_run)?;
    pipeline.run().await?;
    Ok(())
}
