//! Crate entrypoint wiring together configuration, the PowerDNS client, and APIs.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod powerdns;
pub mod translate;
pub mod validation;

use config::AppConfig;
use powerdns::client::PowerDnsClient;

use std::sync::Arc;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub pdns: PowerDnsClient,
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
