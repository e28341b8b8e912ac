//! Marketplace operations
//!
//! Each operation validates its input, performs one read, write, or scan
//! against [`Records`](crate::store::Records), and returns the record to send
//! back. Updates are read-merge-write with no locking, so the last write wins.

pub mod gigs;
pub mod insights;
pub mod offerings;
pub mod transactions;
pub mod users;

/// Empty strings count as missing input
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A zero amount counts as missing input
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.abs() > 0.0)
}
