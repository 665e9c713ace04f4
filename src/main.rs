use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use eve_notify::config::{DEFAULT_CONFIG_PATH, DEFAULT_LOG_PATH, DEFAULT_WEBHOOK_KEY};
use eve_notify::{ScanMode, Settings};

/// Send the latest Suricata stats snapshot to a webhook.
#[derive(Parser, Debug)]
#[command(name = "eve-notify", version, about)]
struct Cli {
    /// EVE log to scan
    #[arg(long, env = "EVE_LOG_PATH", default_value = DEFAULT_LOG_PATH)]
    log_path: PathBuf,

    /// JSON file holding the webhook URL
    #[arg(long, env = "EVE_NOTIFY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config_path: PathBuf,

    /// Key of the webhook URL inside the config file
    #[arg(long, env = "EVE_WEBHOOK_KEY", default_value = DEFAULT_WEBHOOK_KEY)]
    webhook_key: String,

    /// Skip malformed log lines instead of giving up on the first one
    #[arg(long)]
    lenient: bool,

    /// Print the payload without sending it
    #[arg(long)]
    dry_run: bool,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Settings {
            log_path: cli.log_path,
            config_path: cli.config_path,
            webhook_key_name: cli.webhook_key,
            scan_mode: if cli.lenient {
                ScanMode::Lenient
            } else {
                ScanMode::Strict
            },
            dry_run: cli.dry_run,
        }
    }
}

fn main() {
    dotenv().ok();

    // Diagnostics go to stdout alongside the payload preview (RUST_LOG=debug for more)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    let settings = Settings::from(Cli::parse());
    debug!("{:?}", settings);

    // Handled failures still exit 0
    let outcome = eve_notify::run(&settings);
    debug!("run finished: {:?}", outcome);
}
