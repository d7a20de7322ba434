//! notif (v1)
//!
//! Watches Consul health checks and sends one alert per state transition.
//!
//! # Architecture Overview
//!
//! ```text
//!   Consul agent                                              Pager / Slack
//!        │                                                          ▲
//!        ▼                                                          │
//!  ┌───────────┐   mpsc    ┌───────────────┐  raise/clear   ┌──────────────┐
//!  │  watcher  │──────────▶│   processor   │───────────────▶│   notifier   │
//!  │ (blocking │           │ memo + lock + │                └──────────────┘
//!  │  queries) │           │   decide      │
//!  └───────────┘           └───────┬───────┘
//!                                  │ get / put / lock
//!                                  ▼
//!                          ┌───────────────┐
//!                          │  state store  │  notif/<node>/<check>
//!                          │ (Consul KV)   │  notif/<node>/<check>/lock
//!                          └───────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use notif::check::IgnoreList;
use notif::config::{self, NotifConfig, NotifierKind, StoreKind};
use notif::consul::ConsulClient;
use notif::lifecycle::{signals, Shutdown};
use notif::notifier::build_notifier;
use notif::observability::{logging, metrics};
use notif::processor::{spawn_workers, AlertFormatter, Processor};
use notif::store::{CheckStateStore, ConsulStore, MemoryStore, StateStore};
use notif::watch::ConsulWatcher;

/// Key read once at startup to prove the store is reachable.
const PROBE_KEY: &str = "notif/.probe";

#[derive(Parser)]
#[command(name = "notif")]
#[command(about = "Alert on Consul health check transitions", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record current check state without sending any alert.
    #[arg(long)]
    bootstrap: bool,

    /// Consul agent address, overrides `consul.address`.
    #[arg(long)]
    consul_address: Option<String>,

    /// Paging service key, overrides `notifier.pager.service_key`.
    #[arg(long, env = "NOTIF_PAGER_KEY", hide_env_values = true)]
    pager_key: Option<String>,

    /// Notifier backend: pager, slack, print or noop.
    #[arg(long)]
    notifier: Option<NotifierKind>,
}

impl Cli {
    fn apply(&self, config: &mut NotifConfig) {
        if self.bootstrap {
            config.notifier.bootstrap = true;
        }
        if let Some(address) = &self.consul_address {
            config.consul.address = address.clone();
        }
        if let Some(key) = &self.pager_key {
            config.notifier.pager.service_key = key.clone();
            // A key on the command line implies the pager unless told otherwise.
            if self.notifier.is_none() {
                config.notifier.kind = NotifierKind::Pager;
            }
        }
        if let Some(kind) = self.notifier {
            config.notifier.kind = kind;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => NotifConfig::default(),
    };
    cli.apply(&mut config);
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("notif v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        consul_address = %config.consul.address,
        store = ?config.store.kind,
        notifier = ?config.notifier.kind,
        bootstrap = config.notifier.bootstrap,
        workers = config.processor.workers,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let consul = ConsulClient::new(&config.consul)?;

    let backend: Arc<dyn StateStore> = match config.store.kind {
        StoreKind::Consul => Arc::new(ConsulStore::new(consul.clone(), config.lock.clone())),
        StoreKind::Memory => {
            tracing::warn!("memory store selected: state is lost on restart");
            Arc::new(MemoryStore::new(Duration::from_millis(config.lock.acquire_timeout_ms)))
        }
    };
    backend.get(PROBE_KEY).await?;

    let processor = Arc::new(Processor::new(
        CheckStateStore::new(backend),
        build_notifier(&config.notifier),
        IgnoreList::new(config.processor.ignored_prefixes.iter().cloned()),
        AlertFormatter::new(config.processor.ui_url_template.clone()),
    ));

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let (drain_tx, drain_rx) = mpsc::channel(config.watch.channel_capacity);
    let workers = spawn_workers(
        processor,
        drain_rx,
        config.processor.workers,
        config.watch.channel_capacity,
        &shutdown,
    );

    let watcher = ConsulWatcher::new(consul, config.watch.clone(), drain_tx);
    if let Err(e) = watcher.run(shutdown.subscribe()).await {
        tracing::error!(error = %e, "watch stopped");
    }

    shutdown.trigger();
    workers.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
