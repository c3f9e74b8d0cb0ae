//! Network Module
//!
//! TCP server and peer connection handling.
//!
//! ## Architecture
//! - Single acceptor loop on a non-blocking listener
//! - One thread per peer connection
//! - Frames routed through the Dispatcher; relays cross threads via the
//!   registry's per-peer outboxes, so each socket is written by its own thread

mod server;
mod connection;

pub use server::{RouterContext, Server};
pub use connection::Connection;
