use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;
use crate::gateway::GraphqlConfig;
use crate::services::DEFAULT_DEBOUNCE;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `None` runs the daemon against the in-memory gateway.
    pub graphql: Option<GraphqlConfig>,
    pub debounce: Duration,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let graphql = match env::var("GRAPHQL_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => {
                Some(GraphqlConfig::new(endpoint.trim(), read_timeout()?))
            }
            _ => None,
        };

        let debounce = match env::var("SYNC_DEBOUNCE_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| AppError::Config(format!("SYNC_DEBOUNCE_MS is not a number: {}", raw)))?,
            Err(_) => DEFAULT_DEBOUNCE,
        };

        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| AppError::Config(format!("BIND_ADDR is not a socket address: {}", bind_raw)))?;

        Ok(Self {
            graphql,
            debounce,
            bind_addr,
        })
    }
}

fn read_timeout() -> Result<Duration, AppError> {
    match env::var("GRAPHQL_TIMEOUT_SECS") {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Config(format!("GRAPHQL_TIMEOUT_SECS is not a number: {}", raw))),
        Err(_) => Ok(GraphqlConfig::DEFAULT_TIMEOUT),
    }
}
