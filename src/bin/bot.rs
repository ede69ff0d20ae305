use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use question_deck::{
    bot::Responder,
    cache::CacheFile,
    config::{Config, SECTIONS},
    extractor::Extractor,
    fetcher::Fetcher,
    ingest::Ingestor,
    store::SectionRegistry,
    telegram::{Poller, TelegramClient},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Telegram bot serving random 1:1 meeting questions by topic.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Ignore and rebuild the question cache from the network.
    #[arg(short, long)]
    refresh: bool,

    /// Load questions, report what was found and exit.
    #[arg(long)]
    ingest_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let fetcher = Fetcher::new(config.fetch())?;
    let ingestor = Ingestor::new(
        Arc::new(Extractor::new(fetcher)),
        CacheFile::new(config.cache_path()),
        config.fetch().concurrency,
    );

    info!(
        cache = %ingestor.cache().path().display(),
        refresh = cli.refresh,
        "loading questions"
    );
    let mut registry = SectionRegistry::from_defs(SECTIONS);
    let report = ingestor
        .ingest(&mut registry, cli.refresh)
        .await
        .context("question ingestion failed")?;
    info!(
        origin = %report.origin,
        sections = report.sections,
        questions = report.questions,
        "questions ready"
    );

    if cli.ingest_only {
        for section in registry.iter() {
            println!("{:<18} {:>4}  {}", section.key, section.entries().len(), section.title);
        }
        return Ok(());
    }

    let client = TelegramClient::new(config.telegram_api_url(), config.telegram_token()?)?;
    let responder = Responder::new(Arc::new(registry));
    let poller = Poller::new(client, responder);

    let shutdown = CancellationToken::new();
    let shutdown_on_signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal, stopping bot...");
        shutdown_on_signal.cancel();
    });

    poller.run(shutdown).await
}
