use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use upwatch_service::alert::{AlertDispatcher, LogOnlyDispatcher, TwilioDispatcher};
use upwatch_service::audit::AuditLog;
use upwatch_service::config::Config;
use upwatch_service::monitoring::{OutcomeProcessor, ProbeEngine, Scheduler, Worker};
use upwatch_service::store::FileStore;

#[derive(Debug, Parser)]
#[command(name = "upwatch-service", about = "Uptime-monitoring worker")]
struct Args {
    /// Path to the TOML config file (defaults to the XDG config location).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_config(args.config.as_deref())?;
    info!("{config}");

    let store = Arc::new(FileStore::new(&config.storage.data_dir));
    let audit = Arc::new(AuditLog::new(&config.storage.log_dir));
    let alerts: Arc<dyn AlertDispatcher> = if config.sms.enabled {
        Arc::new(TwilioDispatcher::new(config.sms.clone())?)
    } else {
        info!("SMS delivery disabled, alerts will be logged only");
        Arc::new(LogOnlyDispatcher)
    };

    let processor = OutcomeProcessor::new(store.clone(), audit, alerts);
    let worker = Arc::new(Worker::new(store, ProbeEngine::new()?, processor));
    let scheduler = Scheduler::start(worker, Duration::from_secs(config.worker.interval_seconds));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    scheduler.stop().await;
    Ok(())
}
