//! Peer registry implementation
//!
//! Registration-ordered peer list with RwLock for concurrency.

use std::net::{SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use bytes::Bytes;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::RwLock;

use super::{PeerEntry, PeerId};
use crate::error::{Result, RouterError};

/// A registered peer and the sending half of its outbox
struct Peer {
    entry: PeerEntry,
    outbox: Sender<Bytes>,
}

/// Live set of peer connections
pub struct PeerRegistry {
    /// Peers in registration order
    peers: RwLock<Vec<Peer>>,

    /// Next connection id to hand out
    next_id: AtomicU64,
}

impl PeerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a newly accepted connection.
    ///
    /// Returns the new entry and the receiving half of its outbox; frames
    /// relayed to this peer arrive there already encoded.
    pub fn register(&self, endpoint: SocketAddr) -> Result<(PeerEntry, Receiver<Bytes>)> {
        self.register_with_limit(endpoint, usize::MAX)
    }

    /// Register a connection unless `limit` peers are already registered
    pub fn register_with_limit(
        &self,
        endpoint: SocketAddr,
        limit: usize,
    ) -> Result<(PeerEntry, Receiver<Bytes>)> {
        let endpoint = ipv4_endpoint(endpoint)?;
        let (sender, receiver) = channel::unbounded();

        let mut peers = self.peers.write();
        if peers.len() >= limit {
            return Err(RouterError::ConnectionLimit(limit));
        }

        let entry = PeerEntry {
            id: PeerId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            endpoint,
            connected_at: SystemTime::now(),
        };
        peers.push(Peer {
            entry: entry.clone(),
            outbox: sender,
        });

        Ok((entry, receiver))
    }

    /// Remove a peer, returning its entry if it was registered
    pub fn remove(&self, id: PeerId) -> Option<PeerEntry> {
        let mut peers = self.peers.write();
        let index = peers.iter().position(|p| p.entry.id == id)?;
        Some(peers.remove(index).entry)
    }

    /// Look up a single peer
    pub fn get(&self, id: PeerId) -> Option<PeerEntry> {
        self.peers
            .read()
            .iter()
            .find(|p| p.entry.id == id)
            .map(|p| p.entry.clone())
    }

    /// Copy of every registered peer, in registration order
    pub fn snapshot(&self) -> Vec<PeerEntry> {
        self.peers.read().iter().map(|p| p.entry.clone()).collect()
    }

    /// Queue encoded bytes on a peer's outbox.
    ///
    /// Returns false if the peer is gone or its connection stopped reading.
    pub fn send(&self, id: PeerId, bytes: Bytes) -> bool {
        let peers = self.peers.read();
        match peers.iter().find(|p| p.entry.id == id) {
            Some(peer) => peer.outbox.send(bytes).is_ok(),
            None => false,
        }
    }

    /// Number of registered peers
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Only IPv4 peers (or IPv4-mapped IPv6 peers) can be addressed on the wire
fn ipv4_endpoint(endpoint: SocketAddr) -> Result<SocketAddrV4> {
    let v4 = match endpoint {
        SocketAddr::V4(v4) => v4,
        SocketAddr::V6(v6) => v6
            .ip()
            .to_ipv4_mapped()
            .map(|ip| SocketAddrV4::new(ip, v6.port()))
            .ok_or(RouterError::UnsupportedAddress(endpoint))?,
    };

    if v4.ip().is_unspecified() {
        return Err(RouterError::InvalidAddress(v4.to_string()));
    }
    Ok(v4)
}
