//! Dragonhold - Data Dragon mirror

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dragonhold::{
    config::Args,
    ddragon::{DataDragonApi, HttpDataDragon, HttpDataDragonConfig},
    scheduler::{spawn_sync_scheduler, SchedulerConfig},
    server::{self, AppState},
    store::{GameStore, MemoryStore, MongoStore},
    sync::{StatusReporter, SyncEngine, TokioExecutor},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dragonhold={log_level},info").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Dragonhold - Data Dragon mirror");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Upstream: {} ({})", args.ddragon_url, args.language);
    info!("MongoDB: {}", args.mongodb_uri);
    info!(
        "Scheduler: {}",
        if args.scheduler_enabled {
            format!("every {}s", args.sync_interval_secs)
        } else {
            "disabled".to_string()
        }
    );
    info!("======================================");

    // Connect to MongoDB; dev mode falls back to the in-memory store
    let (store, store_backend): (Arc<dyn GameStore>, &'static str) =
        match MongoStore::connect(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(store) => {
                info!("MongoDB store ready");
                (Arc::new(store), "mongodb")
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    (Arc::new(MemoryStore::new()), "memory")
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    let api: Arc<dyn DataDragonApi> =
        Arc::new(HttpDataDragon::new(HttpDataDragonConfig::from_args(&args)));

    let engine = Arc::new(SyncEngine::new(
        Arc::clone(&api),
        Arc::clone(&store),
        Arc::new(TokioExecutor),
    ));
    let reporter = StatusReporter::new(Arc::clone(&api), Arc::clone(&store));

    if args.scheduler_enabled {
        let _scheduler = spawn_sync_scheduler(
            Arc::clone(&engine),
            SchedulerConfig {
                interval: Duration::from_secs(args.sync_interval_secs),
                sync_on_start: args.sync_on_start,
            },
        );
        info!(
            "Sync scheduler spawned (interval {}s, sync_on_start {})",
            args.sync_interval_secs, args.sync_on_start
        );
    }

    let state = Arc::new(AppState::new(
        args,
        engine,
        store,
        reporter,
        store_backend,
    ));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
