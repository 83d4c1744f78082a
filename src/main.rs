//! Taskboard HTTP server.

use std::process::ExitCode;

use taskboard::{
    app::{self, Components},
    config::{AppConfig, LogFormat},
    http::{self, AppState},
    telemetry,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let loaded = AppConfig::from_env();
    let log_format = loaded
        .as_ref()
        .map_or(LogFormat::Text, |parsed| parsed.log_format);
    if telemetry::init(log_format).is_err() {
        return ExitCode::FAILURE;
    }
    if let Err(err) = dotenv
        && !err.not_found()
    {
        warn!(error = %err, "failed to load .env file");
    }
    let config = match loaded {
        Ok(parsed) => parsed,
        Err(err) => {
            error!(error = %err, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    info!(
        storage_mode = ?config.storage_mode,
        cache_ttl_secs = config.task_cache_ttl.as_secs(),
        "starting taskboard"
    );

    match serve(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let components = Components::from_config(config)?;
    if let Some(admin) = config.admin.as_ref() {
        app::ensure_admin(&components.auth, components.users.as_ref(), admin).await?;
    }

    let state = AppState::from(&components);
    let Components {
        tasks,
        dispatcher,
        events,
        stop_events,
        ..
    } = components;
    let dispatcher_task = tokio::spawn(async move { dispatcher.run(events).await });

    let address = config.bind_address()?;
    let listener = TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Dropping the last publisher closes the in-process queue; a durable
    // queue stops polling once signalled. Either way the dispatcher finishes
    // the events it already holds and exits.
    drop(tasks);
    stop_events.send_modify(|stopped| *stopped = true);
    if let Err(err) = dispatcher_task.await {
        warn!(error = %err, "notification dispatcher ended abnormally");
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
