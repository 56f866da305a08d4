mod migrations;

use std::sync::Arc;

use anyhow::Result;
use jellystream_api::{create_router, maintainer, AppState};
use jellystream_core::bootstrap::init_database;
use jellystream_core::logging::init_logging;
use jellystream_core::{Config, Context};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    if let Err(errors) = config.validate() {
        for err in &errors {
            eprintln!("configuration error: {err}");
        }
        std::process::exit(1);
    }

    init_logging(&config.logging)?;
    info!("JellyStream starting");
    info!(address = %config.http_address(), "HTTP server will bind here");

    let pool = init_database(&config).await?;
    migrations::run_migrations(&pool).await?;

    let config = Arc::new(config);
    let ctx = Context::new(config.clone(), pool);

    let maintainer_ctx = ctx.clone();
    tokio::spawn(async move {
        maintainer::run(maintainer_ctx).await;
    });

    let state = AppState::new(ctx, config.clone());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.http_address()).await?;
    info!(address = %config.http_address(), "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "HTTP server exited with error");
            anyhow::anyhow!(e)
        })?;

    info!("JellyStream stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
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
