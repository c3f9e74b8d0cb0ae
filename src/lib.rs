//! # ptprouter
//!
//! A minimal peer-registry router:
//! - Peers register implicitly by connecting over TCP
//! - A text-based wire protocol (`CMD`/`RES` frames) for queries and relays
//! - Version and membership queries answered by the router
//! - Opaque payloads relayed to every connected peer at the listed addresses
//! - A plain HTML status page for anything that looks like an HTTP `GET`
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │             (one thread per peer connection)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Frame Codec                               │
//! │              decode → ParseOutcome                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Dispatcher                                │
//! │      (pure: outcome + registry snapshot → frames)            │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │ reply                            │ relay
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌──────────────────┐
//!   │  sender socket  │               │  Peer Registry   │
//!   │    (encode)     │               │ (per-peer outbox)│
//!   └─────────────────┘               └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod registry;
pub mod dispatch;
pub mod status;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RouterError};
pub use config::Config;
pub use dispatch::{DispatchResult, Dispatcher, Relay};
pub use network::Server;
pub use protocol::{decode, encode, Frame, Kind, ParseErrorKind, ParseOutcome};
pub use registry::{PeerEntry, PeerId, PeerRegistry};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ptprouter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
