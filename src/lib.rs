// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hotel-Compare: a hotel price comparison site.
//!
//! Server-rendered pages over a hotel catalog, with visitor accounts,
//! profiles and bookings kept in a Supabase project.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod store;
pub mod time_utils;

use config::Config;
use services::HotelCatalog;
use session::SessionRegistry;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionRegistry,
    pub catalog: HotelCatalog,
}
