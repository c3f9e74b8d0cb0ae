//! Connection Handler
//!
//! Handles individual peer connections.

use std::io::{self, Read, Write};
use std::net::{SocketAddrV4, TcpStream};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use crossbeam::channel::{Receiver, TryRecvError};

use super::RouterContext;
use crate::dispatch::Relay;
use crate::error::Result;
use crate::protocol::{decode, encode};
use crate::registry::PeerEntry;
use crate::status::render_status_page;

/// Handles a single peer connection
pub struct Connection {
    /// TCP stream, read and written only by this connection's thread
    stream: TcpStream,

    /// Registry entry for this peer
    entry: PeerEntry,

    /// Frames other connections relayed to this peer
    outbox: Receiver<Bytes>,

    /// Shared router state
    context: Arc<RouterContext>,

    /// Receive buffer; one read is one frame
    buffer: Vec<u8>,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// The read timeout doubles as the outbox poll interval.
    pub fn new(
        stream: TcpStream,
        entry: PeerEntry,
        outbox: Receiver<Bytes>,
        context: Arc<RouterContext>,
    ) -> Result<Self> {
        // Accepted sockets may inherit the listener's non-blocking mode
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(context.poll_interval()))?;
        if context.config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(context.config.write_timeout_ms)))?;
        }

        let buffer = vec![0u8; context.config.recv_buffer_size];

        Ok(Self {
            stream,
            entry,
            outbox,
            context,
            buffer,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Alternates between flushing relayed frames and reading requests.
    /// Returns when the peer disconnects, the router shuts down or an error
    /// occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {} ({})", self.entry.endpoint, self.entry.id);

        while !self.context.is_shutting_down() {
            if let Err(e) = self.flush_outbox() {
                return self.finish(e);
            }

            let received = match self.stream.read(&mut self.buffer) {
                Ok(0) => {
                    tracing::debug!("Peer {} disconnected", self.entry.endpoint);
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(e) => return self.finish(e),
            };

            if let Err(e) = self.process(received) {
                return self.finish(e);
            }
        }

        Ok(())
    }

    /// Decode, dispatch and answer one received buffer
    fn process(&mut self, received: usize) -> io::Result<()> {
        let outcome = decode(&self.buffer[..received]);
        tracing::trace!("Received from {}: {:?}", self.entry.endpoint, outcome);

        let snapshot = self.context.registry.snapshot();
        let result = self
            .context
            .dispatcher
            .dispatch(&outcome, self.entry.address(), &snapshot);

        if result.status_page {
            tracing::debug!("Serving status page to {}", self.entry.endpoint);
            let page = render_status_page(&snapshot, SystemTime::now());
            return self.stream.write_all(page.as_bytes());
        }

        if let Some(reply) = &result.reply {
            tracing::debug!("Replying {:?} to {}", reply.kind, self.entry.endpoint);
            self.stream.write_all(&encode(reply))?;
        }

        if !result.relay.is_empty() {
            let delivered = self.relay(&result.relay);
            tracing::debug!(
                "Relayed mailbox from {} to {}/{} connections",
                self.entry.endpoint,
                delivered,
                result.relay.len()
            );
        }

        Ok(())
    }

    /// Queue relayed frames on their targets' outboxes
    fn relay(&self, relays: &[Relay]) -> usize {
        relays
            .iter()
            .filter(|relay| self.context.registry.send(relay.peer, encode(&relay.frame)))
            .count()
    }

    /// Write every frame waiting in this peer's outbox
    fn flush_outbox(&mut self) -> io::Result<()> {
        loop {
            match self.outbox.try_recv() {
                Ok(bytes) => self.stream.write_all(&bytes)?,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
    }

    /// Map an I/O error to the connection's exit status
    fn finish(&self, e: io::Error) -> Result<()> {
        match e.kind() {
            io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => {
                // The peer went away; this is not a router error
                tracing::debug!("Peer {} dropped: {}", self.entry.endpoint, e);
                Ok(())
            }
            _ => {
                tracing::warn!("I/O error on {}: {}", self.entry.endpoint, e);
                Err(e.into())
            }
        }
    }

    /// Get the peer endpoint
    pub fn endpoint(&self) -> SocketAddrV4 {
        self.entry.endpoint
    }
}
