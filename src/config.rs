use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::powerdns::client::DEFAULT_TIMEOUT;

pub const DEFAULT_SERVER_ID: &str = "localhost";
pub const DEFAULT_LISTEN: &str = ":8080";

/// Raw settings as given on the command line or in the environment.
///
/// Every value is trimmed; a blank value means "use the default".
#[derive(Debug, Default, Clone)]
pub struct Settings {
    pub pdns_server: String,
    pub pdns_apikey: String,
    pub pdns_server_id: String,
    pub pdns_timeout_secs: String,
    pub auth_token: String,
    pub addr: String,
}

impl Settings {
    pub fn api_key(&self) -> &str {
        self.pdns_apikey.trim()
    }
}

/// Trimmed `value`, or `default` when it is blank.
pub fn setting_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.trim() {
        "" => default,
        v => v,
    }
}

/// Settings fixed at startup and shared read-only by every request.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pdns_url: String, // e.g. "http://pdns1:8081/api/v1"
    pub pdns_server_id: String,
    pub pdns_timeout: Duration,
    /// Bearer token clients must present; empty disables the check.
    pub auth_token: String,
    pub listen: SocketAddr,
}

impl AppConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let pdns_url = settings.pdns_server.trim();
        if pdns_url.is_empty() {
            bail!("PDNS_SERVER is required. Example: http://pdns1:8081/api/v1");
        }

        let pdns_timeout = match settings.pdns_timeout_secs.trim() {
            "" => DEFAULT_TIMEOUT,
            secs => {
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("invalid upstream timeout '{secs}'"))?;
                if secs == 0 {
                    bail!("upstream timeout must be at least one second");
                }
                Duration::from_secs(secs)
            }
        };

        let addr = setting_or(&settings.addr, DEFAULT_LISTEN);
        let listen =
            parse_listen_addr(addr).with_context(|| format!("invalid listen address '{addr}'"))?;

        Ok(Self {
            pdns_url: pdns_url.trim_end_matches('/').to_string(),
            pdns_server_id: setting_or(&settings.pdns_server_id, DEFAULT_SERVER_ID).to_string(),
            pdns_timeout,
            auth_token: settings.auth_token.trim().to_string(),
            listen,
        })
    }

    pub fn auth_enabled(&self) -> bool {
        !self.auth_token.is_empty()
    }
}

/// Parse a listen address; a bare `:port` binds every interface.
pub fn parse_listen_addr(input: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    let input = input.trim();
    if let Some(port) = input.strip_prefix(':') {
        format!("0.0.0.0:{port}").parse()
    } else {
        input.parse()
    }
}
