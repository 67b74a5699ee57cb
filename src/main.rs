use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use listwatch::app::App;
use listwatch::config::Config;
use listwatch::controller::FeedController;
use listwatch::feed::{FeedEnvelope, WsFeedClient, WsFeedConfig};
use listwatch::ui;

/// Capacity of the feed event channel.
const FEED_CHANNEL_CAPACITY: usize = 256;

/// Get the config directory path (~/.config/listwatch/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("listwatch"))
}

#[derive(Parser)]
#[command(name = "listwatch", about = "Live marketplace listings in the terminal")]
struct Args {
    /// API key to connect with at startup
    #[arg(long, env = "LISTWATCH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (default: ~/.config/listwatch/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// WebSocket URL of the feed, overriding the config file
    #[arg(long, value_name = "URL")]
    feed_url: Option<String>,

    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Install the tracing subscriber.
///
/// The TUI owns stdout, so logs only go to a file.
fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;
    tracing::debug!(?config, path = %config_path.display(), "Configuration ready");

    let client = WsFeedClient::new(WsFeedConfig {
        url: args.feed_url.clone().unwrap_or_else(|| config.feed_url.clone()),
        ping_interval: config.ping_interval(),
    });

    let (feed_tx, feed_rx) = mpsc::channel::<FeedEnvelope>(FEED_CHANNEL_CAPACITY);
    let controller = FeedController::new(Arc::new(client), feed_tx);
    let mut app = App::new(&config, controller);

    // Preset key: --api-key / LISTWATCH_API_KEY, then the config file
    if let Some(key) = args.api_key.or_else(|| config.api_key.clone()) {
        app.key_input = key;
        if app.submit_key() {
            tracing::info!("Connecting with preset API key");
        }
    }

    let result = ui::run(&mut app, feed_rx).await;

    // Disconnect before the runtime shuts down
    app.controller.teardown();
    result?;

    println!("Goodbye!");
    Ok(())
}
