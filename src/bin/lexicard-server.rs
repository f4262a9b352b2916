//! lexicard-server: the web front end of the marking workflow.
//!
//! Reads its configuration from the environment and refuses to start when a
//! mandatory variable is missing. See `lexicard::server` for the routes.
//!
//! Build and run: `cargo run --bin lexicard-server`

use std::sync::Arc;

use lexicard::config::Config;
use lexicard::pipeline::EnrichmentPipeline;
use lexicard::server::{AppState, router};
use lexicard::store::DurableWordStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn")),
        )
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::error!("invalid configuration: {e}");
        std::process::exit(1);
    });

    let store = DurableWordStore::open(&config.store_path).unwrap_or_else(|e| {
        tracing::error!("failed to open word store: {e}");
        std::process::exit(1);
    });

    let state = AppState {
        store: Arc::new(store),
        pipeline: Arc::new(EnrichmentPipeline::from_config(&config)),
        request_timeout: config.server.request_timeout(),
    };
    let app = router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        });
    tracing::info!(store = %config.store_path.display(), "lexicard-server listening on {addr}");

    // Serve with graceful shutdown on SIGTERM/SIGINT.
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let ctrl_c = tokio::signal::ctrl_c();
            #[cfg(unix)]
            {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        tokio::select! {
                            _ = ctrl_c => {},
                            _ = sigterm.recv() => {},
                        }
                    }
                    Err(e) => {
                        tracing::warn!("failed to register SIGTERM handler: {e}");
                        ctrl_c.await.ok();
                    }
                }
            }
            #[cfg(not(unix))]
            {
                ctrl_c.await.ok();
            }
            tracing::info!("lexicard-server shutting down");
        })
        .await;

    if let Err(e) = served {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
