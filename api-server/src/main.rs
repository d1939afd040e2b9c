//! Reelsync server binary.
//!
//! Loads configuration from the environment (and `.env`), sets up logging,
//! starts the sync worker and the optional cron trigger, then serves HTTP
//! until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_server::{create_router, AppState};
use bridge_native::RotatingFileSink;
use core_runtime::config::AppConfig;
use core_runtime::logging::init_logging;
use core_service::{CoreService, ScheduleSettings, SyncScheduler};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;

    let mut logging = config.logging.to_logging_config();
    if let Some(dir) = &config.logging.dir {
        let sink = RotatingFileSink::new(dir, config.logging.level)
            .await
            .with_context(|| format!("opening log directory {}", dir.display()))?;
        logging = logging.with_logger_sink(Arc::new(sink));
    }
    init_logging(logging).context("initializing logging")?;

    let core = Arc::new(CoreService::bootstrap(&config).context("starting core service")?);

    let scheduler = match ScheduleSettings::from_config(&config.schedule) {
        Ok(Some(settings)) => match SyncScheduler::start(settings, Arc::clone(&core)).await {
            Ok(scheduler) => Some(scheduler),
            Err(e) => {
                error!(error = %e, "Failed to start scheduler");
                None
            }
        },
        Ok(None) => {
            info!("Scheduled sync disabled");
            None
        }
        Err(e) => {
            warn!(error = %e, "Invalid schedule settings; scheduled sync disabled");
            None
        }
    };

    let app = create_router(AppState::new(Arc::clone(&core)));
    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;
    info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Scheduler did not stop cleanly");
        }
    }
    core.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
