//! Logger module
//!
//! Provides logging utilities for the marketplace server including:
//! - Subscriber setup from configuration
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// application startup.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    info!("======================================");
    info!("Gig marketplace API started");
    info!("Listening on: http://{addr}");
    info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    info!(
        backend = ?config.store.backend,
        path = %config.store.path.display(),
        "Record store"
    );
    info!("Commission rate: {}", config.marketplace.commission_rate);
    info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    info!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    error!("{message}");
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}

/// Log a request that failed on the store, with its underlying cause
pub fn log_store_failure(context: &str, source: &dyn std::error::Error) {
    error!(cause = %source, "{context}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    info!(target: "access", "{}", entry.format(format));
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    debug!("[API] {method} {path} - {status}");
}

pub fn log_shutdown_requested(active_connections: usize) {
    info!("[Shutdown] Accept loop stopped, {active_connections} connection(s) still in flight");
}
