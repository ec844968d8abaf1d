use std::env;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL of this node, as peers know it.
    pub node_url: String,
    pub peer_timeout: Duration,
}

impl Config {
    /// `HOST`, `PORT`, `NODE_URL`, `PEER_TIMEOUT_SECS`. A first CLI argument,
    /// if present, overrides `PORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok(), env::args().nth(1))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, port_arg: Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = port_arg
            .or_else(|| lookup("PORT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let node_url = lookup("NODE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let peer_timeout = lookup("PEER_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS));

        Self {
            host,
            port,
            node_url,
            peer_timeout,
        }
    }
}
