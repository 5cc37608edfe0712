//! content-relay server entry point.
//!
//! Connects the content store (with supervised retry), optionally
//! starts the broker consumer, and serves the HTTP read path.

use std::sync::Arc;

use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use content_relay::api;
use content_relay::app_state::AppState;
use content_relay::config::{RelayConfig, StoreBackend};
use content_relay::domain::{ApplyOutcome, OutcomeBus};
use content_relay::persistence::{ContentStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting content-relay");

    // Connect the content store. The database is a mandatory dependency
    // once configured: exhausting the retry budget terminates the
    // process and leaves the restart to the orchestrator.
    let store: Arc<dyn ContentStore> = match config.backend {
        StoreBackend::Postgres => match PostgresStore::connect(&config).await {
            Ok(store) => Arc::new(store),
            Err(error) => {
                tracing::error!(error = %error, "content store is unavailable; exiting");
                std::process::exit(1);
            }
        },
        StoreBackend::Memory => {
            tracing::warn!("using volatile in-memory store; contents do not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    // Outcome signals from the consumer loop feed the logging task.
    let outcomes = OutcomeBus::new(config.outcome_bus_capacity);
    tokio::spawn(log_outcomes(outcomes.subscribe()));

    // Start the consumer only when a broker is configured.
    #[cfg(feature = "kafka")]
    if let Some(broker) = config.broker.clone() {
        let applier =
            content_relay::consumer::ChangeApplier::new(Arc::clone(&store), outcomes.clone());
        let transport = content_relay::consumer::kafka::KafkaTransport::connect(&broker)?;
        tokio::spawn(async move {
            applier.run(transport).await;
        });
    }

    #[cfg(not(feature = "kafka"))]
    if config.broker.is_some() {
        tracing::warn!(
            "BROKER_SERVERS is set but this build carries no broker client; \
             rebuild with the `kafka` feature to consume"
        );
    }

    // Build application state and router
    let app_state = AppState {
        store,
        content_max_age_secs: config.content_max_age_secs,
    };

    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Logs every apply outcome with structured fields.
async fn log_outcomes(mut receiver: broadcast::Receiver<ApplyOutcome>) {
    loop {
        match receiver.recv().await {
            Ok(ApplyOutcome::Stored { key, path }) => {
                tracing::info!(key = %key, path = path.as_deref().unwrap_or(""), "content stored");
            }
            Ok(ApplyOutcome::Deleted { key, path }) => {
                tracing::info!(key = %key, path = path.as_deref().unwrap_or(""), "content deleted");
            }
            Ok(ApplyOutcome::Failed {
                operation,
                key,
                path,
                error,
            }) => {
                tracing::error!(
                    operation,
                    key = key.as_deref().unwrap_or(""),
                    path = path.as_deref().unwrap_or(""),
                    error = %error,
                    "message processing failed"
                );
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "outcome logger lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
