//! Expenseweb main entry point

use anyhow::Context;
use clap::Parser;
use expenseweb_api::start_server;
use expenseweb_client::RemoteExpenseApi;
use expenseweb_config::Config;
use expenseweb_core::{Session, SourceRef};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "expenseweb")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight expense tracker web client with demo-mode fallback", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    // logger is not up yet; print the diagnostics directly
    let config = match Config::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e).with_context(|| {
                format!("Failed to load configuration from {}", args.config.display())
            });
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if !args.config.exists() {
        log::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    }
    log::info!(
        "Config loaded: api base={}, demo mode forced={}",
        if config.has_api_base() { config.api.base_url.as_str() } else { "(none)" },
        config.api.use_demo_mode
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let source: SourceRef = Arc::new(RemoteExpenseApi::new(&config.api));
        let session = Arc::new(RwLock::new(Session::new(&config)));

        {
            let mut guard = session.write().await;
            let mode = guard.load(source.as_ref()).await;
            log::info!("Initial load done: mode={}, status={}", mode, guard.status());
        }

        start_server(config, session, source)
            .await
            .context("Server error")
    })
}
