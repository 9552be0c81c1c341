use std::{net::SocketAddr, time::Duration};

use cardprice_market_data::SourceCredentials;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Period of the background `max_throughput` refresh; disabled when unset.
    pub schedule_interval: Option<Duration>,
    /// JSON file overriding engine defaults.
    pub engine_config_path: Option<String>,
    pub credentials: SourceCredentials,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("CP_LISTEN_ADDR")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let db_path = std::env::var("CP_DB_PATH").unwrap_or_else(|_| "./db/cardprice.db".into());
        let cors_allow = std::env::var("CP_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("CP_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "120000".into())
            .parse()
            .unwrap_or(120000);
        let schedule_interval = std::env::var("CP_SCHEDULE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let engine_config_path = std::env::var("CP_ENGINE_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            schedule_interval,
            engine_config_path,
            credentials: SourceCredentials::from_env(),
        }
    }
}
