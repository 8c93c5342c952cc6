/// Configuration management for fedinfo
use crate::error::{FedinfoError, FedinfoResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to (e.g. "0.0.0.0:8080")
    pub listen: String,
    /// How long in-flight requests may drain after an interrupt
    pub shutdown_timeout: Duration,
}

/// Software cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Snapshot file loaded at startup and written at exit
    pub file: Option<PathBuf>,
    /// Maximum age of a cached identity since it was last observed
    pub ttl: Duration,
}

/// NodeInfo resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// User-Agent header for outbound requests
    pub user_agent: String,
    /// Per-request timeout for each discovery hop
    pub fetch_timeout: Duration,
    /// Scheme used for the well-known lookup
    pub well_known_scheme: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("fedinfo/{}", env!("CARGO_PKG_VERSION")),
            fetch_timeout: Duration::from_secs(10),
            well_known_scheme: "https".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber` filter directives (e.g. "info" or "fedinfo=debug")
    pub level: String,
}

impl LoggingConfig {
    /// Build the subscriber filter, falling back to "info" on bad directives
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// A local `.env` takes precedence; `/etc/fedinfo/env` is tried when it
    /// is absent.
    pub fn from_env() -> FedinfoResult<Self> {
        if dotenv::from_filename(".env").is_err() {
            dotenv::from_filename("/etc/fedinfo/env").ok();
        }

        let listen = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let shutdown_timeout = seconds_var("FEDINFO_SHUTDOWN_TIMEOUT", 60)?;

        let file = env::var("CACHE_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let ttl = seconds_var("FEDINFO_CACHE_TTL", 3600)?;

        let defaults = ResolverConfig::default();
        let user_agent = env::var("FEDINFO_USER_AGENT").unwrap_or(defaults.user_agent);
        let fetch_timeout = seconds_var("FEDINFO_FETCH_TIMEOUT", 10)?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                listen,
                shutdown_timeout,
            },
            cache: CacheConfig { file, ttl },
            resolver: ResolverConfig {
                user_agent,
                fetch_timeout,
                well_known_scheme: defaults.well_known_scheme,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> FedinfoResult<()> {
        if self.service.listen.trim().is_empty() {
            return Err(FedinfoError::Config("Listen address cannot be empty".to_string()));
        }

        if self.resolver.fetch_timeout.is_zero() {
            return Err(FedinfoError::Config(
                "Fetch timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Read a whole number of seconds from `key`, falling back to `default`
fn seconds_var(key: &str, default: u64) -> FedinfoResult<Duration> {
    match env::var(key) {
        Ok(raw) => parse_seconds(key, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_seconds(key: &str, raw: &str) -> FedinfoResult<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| FedinfoError::Config(format!("{} must be a number of seconds, got {:?}", key, raw)))
}
