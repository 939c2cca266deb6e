// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hotel-Compare Web Server
//!
//! Serves the hotel price comparison site: catalog search, visitor
//! sign-in through Supabase, profiles and bookings.

use hotel_compare::{
    config::{Config, SessionBackend},
    services::HotelCatalog,
    session::SessionRegistry,
    store::{MemoryBackend, SessionStoreFactory, SupabaseClient},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle sessions are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Hotel-Compare");

    let factory: Arc<dyn SessionStoreFactory> = match &config.backend {
        SessionBackend::Supabase { url, anon_key } => {
            tracing::info!(url = %url, "Using Supabase session store");
            Arc::new(SupabaseClient::new(url, anon_key.clone()))
        }
        SessionBackend::Memory => {
            tracing::warn!("Using in-memory session store; accounts are lost on restart");
            Arc::new(MemoryBackend::new())
        }
    };

    // Load hotel catalog
    tracing::info!(path = %config.hotels_path, "Loading hotel catalog");
    let catalog = match HotelCatalog::load_from_file(&config.hotels_path) {
        Ok(catalog) => {
            tracing::info!(count = catalog.hotels().len(), "Hotel catalog loaded");
            catalog
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load hotel catalog, starting with none");
            HotelCatalog::default()
        }
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sessions: SessionRegistry::new(factory),
        catalog,
    });

    // Sweep idle sessions in the background
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            interval.tick().await;
            sweeper
                .sessions
                .evict_idle(sweeper.config.session_idle_timeout);
        }
    });

    // Build router
    let app = hotel_compare::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hotel_compare=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
