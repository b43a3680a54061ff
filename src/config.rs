//! Server configuration from the environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::database::DatabaseConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub request_timeout: Duration,
    pub run_migrations: bool,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `REQUEST_TIMEOUT_SECS`, `RUN_MIGRATIONS`
    /// and the database variables. Unset variables take their defaults;
    /// set but malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(v) => v.parse().with_context(|| format!("invalid BIND_ADDR '{}'", v))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match lookup("PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid PORT '{}'", v))?,
            None => 5000,
        };
        let timeout_secs: u64 = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid REQUEST_TIMEOUT_SECS '{}'", v))?,
            None => 30,
        };
        let run_migrations = lookup("RUN_MIGRATIONS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            bind_addr,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            run_migrations,
            database: DatabaseConfig::default(),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
