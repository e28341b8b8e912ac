// Application state module
// Shared by every connection: configuration, record store and shutdown signal

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::store::Records;

/// Application state
pub struct AppState {
    pub config: Config,
    pub records: Records,
    pub shutdown_signal: Arc<Notify>,
}

impl AppState {
    pub fn new(config: Config, records: Records) -> Self {
        Self {
            config,
            records,
            shutdown_signal: Arc::new(Notify::new()),
        }
    }

    pub const fn commission_rate(&self) -> f64 {
        self.config.marketplace.commission_rate
    }
}
