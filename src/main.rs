// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Throne-Tracker view server
//!
//! Hosts one client session and serves the screen, standings and actions
//! to the browser front-end as JSON.

use std::sync::Arc;
use throne_tracker::{
    config::Config,
    services::{Connector, HttpConnector, IdentityVerifier, MemoryConnector},
    session::{Session, SessionSettings},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Throne-Tracker");

    let connector: Arc<dyn Connector> = match &config.backend_url {
        Some(url) => {
            tracing::info!(backend_url = %url, "Using HTTP backend");
            Arc::new(HttpConnector::new(url.clone(), config.request_timeout)?)
        }
        None => {
            tracing::warn!("BACKEND_URL not set, using offline in-memory backend");
            Arc::new(MemoryConnector::new())
        }
    };

    let session = Session::new(connector, SessionSettings::from_config(&config));
    session.initialize(None).await;

    // Build shared state
    let state = Arc::new(AppState {
        verifier: IdentityVerifier::new(&config.identity_jwt_key),
        session,
        config: config.clone(),
    });

    // Build router
    let app = throne_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("throne_tracker=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
