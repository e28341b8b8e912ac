// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::{Config, StoreBackend, StoreConfig};

/// Environment variable prefix, e.g. `GIGS__SERVER__PORT=9000`
const ENV_PREFIX: &str = "GIGS";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "gig-market/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("store.backend", "memory")?
            .set_default("store.path", "data/gigs.sled")?
            .set_default(
                "marketplace.commission_rate",
                crate::services::transactions::DEFAULT_COMMISSION_RATE,
            )?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the layered configuration
    pub fn with_overrides(mut self, port: Option<u16>, store_path: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(path) = store_path {
            self.store.backend = StoreBackend::Sled;
            self.store.path = path;
        }
        self
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let rate = self.marketplace.commission_rate;
        if !(0.0..1.0).contains(&rate) {
            return Err(config::ConfigError::Message(format!(
                "marketplace.commission_rate must be in [0, 1), got {rate}"
            )));
        }
        Ok(())
    }
}
