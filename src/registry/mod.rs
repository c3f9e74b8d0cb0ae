//! Registry Module
//!
//! The live set of peer connections known to the router.
//!
//! ## Responsibilities
//! - Register a peer when its connection is accepted
//! - Remove it when the connection ends
//! - Hand out ordered, immutable snapshots for dispatch
//! - Deliver relayed frames to a specific connection's outbox
//!
//! ## Data Structure Choice
//! A `Vec` in registration order behind a `parking_lot::RwLock`:
//! - Snapshot order is connection order, which is what `QueryMembers` reports
//! - Peers are keyed by `PeerId`, never by address; several connections may
//!   share one address

mod table;

pub use table::PeerRegistry;

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, SystemTime};

/// Identity of one connection, unique for the lifetime of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// A registered peer connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEntry {
    /// Connection identity
    pub id: PeerId,

    /// Remote address and port
    pub endpoint: SocketAddrV4,

    /// When the connection was accepted
    pub connected_at: SystemTime,
}

impl PeerEntry {
    /// The peer's IPv4 address
    pub fn address(&self) -> Ipv4Addr {
        *self.endpoint.ip()
    }

    /// How long the peer has been connected as of `now`
    pub fn connected_for(&self, now: SystemTime) -> Duration {
        now.duration_since(self.connected_at).unwrap_or_default()
    }
}
