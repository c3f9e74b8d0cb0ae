//! Error types for ptprouter
//!
//! Provides a unified error type for the router shell. Wire-level decode
//! failures are not errors: they travel as `ParseOutcome::Failure` values.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias using RouterError
pub type Result<T> = std::result::Result<T, RouterError>;

/// Unified error type for ptprouter operations
#[derive(Debug, Error)]
pub enum RouterError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Addressing Errors
    // -------------------------------------------------------------------------
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Unsupported peer address: {0} (only IPv4 peers are routed)")]
    UnsupportedAddress(SocketAddr),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Request rejected by router: {0}")]
    Rejected(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Connection limit reached ({0} peers)")]
    ConnectionLimit(usize),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
