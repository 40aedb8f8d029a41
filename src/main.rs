use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use permit_watcher::check_logger::CheckLogger;
use permit_watcher::config::{AppConfig, ConfigOverrides};
use permit_watcher::extractor::StatusExtractor;
use permit_watcher::inspect::PageInspection;
use permit_watcher::plugins::notifiers::DiscordNotifier;
use permit_watcher::plugins::NotifierPlugin;
use permit_watcher::scraper::{ChromeRenderer, PageRenderer};
use permit_watcher::state_store::StateStore;
use permit_watcher::utils::{fs, logging};
use permit_watcher::{CheckOutcome, ParkingMonitor};

#[derive(Debug, Parser)]
#[command(name = "permit-watcher", version)]
#[command(about = "Watches a parking permit listing and notifies when it becomes available")]
struct Cli {
    /// Directory holding default.toml, <RUN_MODE>.toml and local.toml
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    /// Reservation page to monitor
    #[arg(long, global = true)]
    url: Option<String>,

    /// Exact listing name on the page
    #[arg(long, global = true)]
    listing: Option<String>,

    /// Discord webhook URL
    #[arg(long, global = true)]
    webhook: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one check (default)
    Check,
    /// Send a test message to the configured webhook
    TestNotification,
    /// Show the stored state
    Status,
    /// Show recent checks
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Render the page once, save it and show what each strategy sees
    Debug,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        url: cli.url,
        listing_name: cli.listing,
        webhook_url: cli.webhook,
    };
    let config = AppConfig::load(&cli.config_dir, &overrides).context("Invalid configuration")?;
    let _guard = logging::init(&config.logging, &config.storage.data_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(cli.command.unwrap_or(Commands::Check), config));
    // A timed-out render may still hold a blocking thread
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Check => check(config).await,
        Commands::TestNotification => test_notification(config).await,
        Commands::Status => status(&config),
        Commands::History { limit } => history(&config, limit),
        Commands::Debug => debug(&config).await,
    }
}

async fn check(config: AppConfig) -> Result<()> {
    if config.notifications.discord.webhook_url.is_none() {
        warn!("Discord webhook URL not set, notifications will be skipped");
    }

    let renderer = Arc::new(ChromeRenderer::new(config.scraper.clone()));
    let notifier = Arc::new(DiscordNotifier::new(config.notifications.discord.clone())?);
    let monitor = ParkingMonitor::new(&config, renderer, notifier);

    match monitor.run_check().await {
        Ok(CheckOutcome::Checked { record, notification_sent, .. }) => {
            info!(status = %record.status, price = %record.price, notification_sent, "Check completed");
            Ok(())
        }
        Ok(CheckOutcome::Failed { kind, error_count, escalated }) => {
            warn!(?kind, error_count, escalated, "Check completed with errors");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Check aborted");
            Err(e.into())
        }
    }
}

async fn test_notification(config: AppConfig) -> Result<()> {
    if config.notifications.discord.webhook_url.is_none() {
        anyhow::bail!("No Discord webhook URL configured (set DISCORD_WEBHOOK_URL or --webhook)");
    }

    let notifier = DiscordNotifier::new(config.notifications.discord)?;
    if notifier.test_connection().await? {
        println!("✅ Test notification sent");
        Ok(())
    } else {
        anyhow::bail!("Test notification was not delivered, check the webhook URL")
    }
}

fn status(config: &AppConfig) -> Result<()> {
    let state = StateStore::new(config.storage.state_path()).load()?;
    let history = CheckLogger::from_config(&config.storage);

    println!("Target:        {}", config.monitor.listing_name);
    println!("URL:           {}", config.monitor.url);
    println!("Status:        {}", state.status());
    if let Some(record) = &state.last_record {
        println!("Price:         {}", record.price);
        println!("Observed at:   {}", record.observed_at.to_rfc3339());
    }
    println!(
        "Last check:    {}",
        state.last_check.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".into())
    );
    println!("Error count:   {}", state.error_count);
    if let Some(last_error) = state.last_error {
        println!("Last error:    {}", last_error.to_rfc3339());
    }
    println!(
        "Last available: {}",
        history
            .last_available_time()?
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".into())
    );
    Ok(())
}

fn history(config: &AppConfig, limit: usize) -> Result<()> {
    let entries = CheckLogger::from_config(&config.storage).recent(limit)?;
    if entries.is_empty() {
        println!("No checks recorded yet");
    }
    for entry in entries {
        println!("{}", entry.summary_line());
    }
    Ok(())
}

async fn debug(config: &AppConfig) -> Result<()> {
    let renderer = ChromeRenderer::new(config.scraper.clone());
    let rendered = renderer
        .render(&config.monitor.url)
        .await
        .context("Failed to render the reservation page")?;

    let page_path = config.storage.data_dir.join("debug_page.html");
    fs::write_atomic(&page_path, rendered.as_bytes())?;
    info!(path = %page_path.display(), bytes = rendered.len(), "Rendered page saved");

    let extractor = StatusExtractor::from_config(&config.monitor);
    let inspection = PageInspection::new(
        &extractor,
        &config.monitor.url,
        &rendered,
        &config.monitor.listing_name,
    );
    println!("Saved:   {}", page_path.display());
    print!("{}", inspection.report());
    Ok(())
}
