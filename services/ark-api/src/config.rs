//! Service configuration loaded from environment variables.

use std::collections::BTreeSet;
use std::env;
use std::net::SocketAddr;

use crate::auth::{self, AuthMode};
use crate::error::ApiError;
use crate::timeout::parse_timeout_to_seconds;

/// Watch budget used when neither the request nor `QUERY_TIMEOUT` sets one.
pub const DEFAULT_QUERY_TIMEOUT_SECONDS: u64 = 300;

/// Runtime configuration for the API service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Namespace queries are created in
    pub namespace: String,
    /// Authentication mode advertised in the OpenAPI schema
    pub auth_mode: AuthMode,
    /// Paths exempt from authentication
    pub public_routes: BTreeSet<String>,
    /// Default watch budget in seconds, always positive
    pub query_timeout_seconds: u64,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ApiError::InvalidConfig(format!("BIND_ADDR: {e}")))?;

        Ok(Self {
            bind_addr,
            namespace: lookup("NAMESPACE").unwrap_or_else(|| "default".to_string()),
            auth_mode: AuthMode::parse(&lookup("AUTH_MODE").unwrap_or_default()),
            public_routes: auth::public_routes(lookup("PUBLIC_ROUTES").as_deref()),
            query_timeout_seconds: parse_timeout_to_seconds(lookup("QUERY_TIMEOUT").as_deref())
                .filter(|seconds| *seconds > 0)
                .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECONDS),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            namespace: "default".to_string(),
            auth_mode: AuthMode::Open,
            public_routes: auth::public_routes(None),
            query_timeout_seconds: DEFAULT_QUERY_TIMEOUT_SECONDS,
        }
    }
}
