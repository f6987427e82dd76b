use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pdnsapi::{
    AppState, SharedState, api,
    config::{AppConfig, DEFAULT_LISTEN, DEFAULT_SERVER_ID, Settings},
    powerdns::client::{DEFAULT_TIMEOUT, PowerDnsClient},
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// PowerDNS API base URL including /api/v1 (e.g. http://pdns1:8081/api/v1)
    #[arg(long, env = "PDNS_SERVER", value_name = "URL")]
    pdns_server: String,
    /// PowerDNS API key sent as X-API-Key
    #[arg(long, env = "PDNS_APIKEY", value_name = "KEY", default_value = "", hide_env_values = true)]
    pdns_apikey: String,
    /// PowerDNS server ID
    #[arg(long, env = "PDNS_SERVER_ID", value_name = "ID", default_value = DEFAULT_SERVER_ID)]
    pdns_server_id: String,
    /// Upstream request timeout in seconds
    #[arg(long, env = "PDNS_TIMEOUT_SECS", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs().to_string())]
    pdns_timeout_secs: String,
    /// Bearer token required from clients; empty disables authentication
    #[arg(long, env = "AUTH_TOKEN", value_name = "TOKEN", default_value = "", hide_env_values = true)]
    auth_token: String,
    /// Listen address for the HTTP server (":8080" binds all interfaces)
    #[arg(long, env = "ADDR", value_name = "ADDR", default_value = DEFAULT_LISTEN)]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = Cli::parse().into_settings();
    let config = AppConfig::from_settings(&settings)?;
    let listen = config.listen;
    if !config.auth_enabled() {
        warn!("AUTH_TOKEN is empty; requests are accepted without a bearer token");
    }
    let state = init_shared_state(&settings, config)?;

    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind to {listen}"))?;

    info!(
        "pdns wrapper listening on http://{} (server={}, server-id={})",
        listener.local_addr()?,
        state.config.pdns_url,
        state.config.pdns_server_id
    );

    let app = api::create_router(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

fn init_shared_state(settings: &Settings, config: AppConfig) -> Result<SharedState> {
    let pdns = PowerDnsClient::new(
        &config.pdns_url,
        settings.api_key(),
        &config.pdns_server_id,
        config.pdns_timeout,
    )
    .context("failed to build PowerDNS client")?;

    Ok(Arc::new(AppState { config, pdns }))
}

impl Cli {
    fn into_settings(self) -> Settings {
        Settings {
            pdns_server: self.pdns_server,
            pdns_apikey: self.pdns_apikey,
            pdns_server_id: self.pdns_server_id,
            pdns_timeout_secs: self.pdns_timeout_secs,
            auth_token: self.auth_token,
            addr: self.addr,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install CTRL+C handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
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
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
