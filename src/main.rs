use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;

/// Registration backend for the HackVibe 2025 hackathon
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override the HTTP listen port from the environment
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Load and print the configuration, then exit (for deployment checks)
    #[arg(long)]
    check_config: bool,
}

mod config;
mod email;
mod error;
mod messages;
mod models;
mod receipt;
mod store;
mod validation;
mod web;
mod wizard;

use config::AppConfig;
use email::create_mailer;
use store::{RegistrationStore, ScreenshotStorage, SupabaseBucket, SupabaseRegistrations};
use web::AppState;
use wizard::create_shared_wizard_manager;

/// How often idle wizard sessions are swept.
const SESSION_SWEEP_SECS: u64 = 600;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Configuration error: {} (set it in .env or the environment)", e))?;

    info!("Store endpoint: {}", config.supabase_url);
    info!("Screenshot bucket: {}", config.screenshot_bucket);
    if config.email_api_url.is_some() {
        info!("Email dispatch: HTTP API");
    } else {
        info!("Email dispatch: disabled (log-only)");
    }

    if args.check_config {
        info!("Configuration OK");
        return Ok(());
    }

    let store: Arc<dyn RegistrationStore> = Arc::new(SupabaseRegistrations::new(
        &config.supabase_url,
        &config.supabase_key,
    ));
    let screenshots: Arc<dyn ScreenshotStorage> = Arc::new(SupabaseBucket::new(
        &config.supabase_url,
        &config.supabase_key,
        &config.screenshot_bucket,
    ));
    let mailer = create_mailer(
        config.email_api_url.clone(),
        config.email_api_key.clone(),
        config.mail_from.clone(),
    );

    let wizards = create_shared_wizard_manager(store.clone(), screenshots, mailer);

    // Sweep abandoned sessions so their timers don't pile up
    {
        let wizards = wizards.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_SECS));
            loop {
                interval.tick().await;
                wizards.cleanup_stale();
            }
        });
    }

    let port = args.port.unwrap_or(config.http_port);
    info!("Starting registration server...");
    web::start_web_server(port, AppState { wizards, store }).await
}
