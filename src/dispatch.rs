//! Dispatch Module
//!
//! Maps a decoded frame onto the peer registry.
//!
//! ## Responsibilities
//! - Answer version and membership queries directly
//! - Turn `SendToMembers` into one mailbox frame per matching connection
//! - Convert every decode failure into a `ResponseMalformedCommand` reply
//!
//! Dispatch is a pure function of the outcome, the sender address and a
//! registry snapshot. It performs no I/O; the connection loop writes the
//! reply and hands relays to the registry.

use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::config::DEFAULT_ROUTER_VERSION;
use crate::protocol::{Frame, Kind, ParseErrorKind, ParseOutcome};
use crate::registry::{PeerEntry, PeerId};

/// Content of the reply to an unrecognised kind
pub const UNKNOWN_COMMAND_MESSAGE: &str = "Unknown Command, cannot process.";

/// Leading text of the reply to a malformed request
pub const MALFORMED_MESSAGE_PREFIX: &str = "Could not parse request, error code: ";

/// Instruction to deliver a frame to one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    /// Target connection
    pub peer: PeerId,

    /// Target address, as listed by the sender
    pub address: Ipv4Addr,

    /// Frame to deliver
    pub frame: Frame,
}

/// What the connection loop should do with one received buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Frame to send back to the sender
    pub reply: Option<Frame>,

    /// Frames to deliver to other connections
    pub relay: Vec<Relay>,

    /// The buffer was an HTTP probe; answer with the status page
    pub status_page: bool,
}

impl DispatchResult {
    fn reply(frame: Frame) -> Self {
        Self {
            reply: Some(frame),
            ..Self::default()
        }
    }

    fn relay(relay: Vec<Relay>) -> Self {
        Self {
            relay,
            ..Self::default()
        }
    }

    fn status_page() -> Self {
        Self {
            status_page: true,
            ..Self::default()
        }
    }
}

/// Stateless command dispatcher
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Content of the `QueryVersion` reply
    version: Bytes,
}

impl Dispatcher {
    /// Create a dispatcher answering `QueryVersion` with `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Bytes::from(version.into()),
        }
    }

    /// Decide the reply and relays for one decode outcome
    ///
    /// `peers` must reflect the registry at the moment of the call.
    pub fn dispatch(
        &self,
        outcome: &ParseOutcome,
        sender: Ipv4Addr,
        peers: &[PeerEntry],
    ) -> DispatchResult {
        match outcome {
            ParseOutcome::Success(frame) => self.dispatch_frame(frame, sender, peers),
            ParseOutcome::HttpProbe => DispatchResult::status_page(),
            ParseOutcome::Failure(kind) => DispatchResult::reply(malformed_reply(*kind)),
        }
    }

    /// Routes frames to the appropriate handlers
    fn dispatch_frame(&self, frame: &Frame, sender: Ipv4Addr, peers: &[PeerEntry]) -> DispatchResult {
        match frame.kind {
            Kind::QueryVersion => DispatchResult::reply(Frame::with_content(
                Kind::ResponseToQuery,
                self.version.clone(),
            )),
            Kind::QueryMembers => {
                let mut reply = Frame::new(Kind::ResponseToQuery);
                reply.addresses = peers.iter().map(PeerEntry::address).collect();
                DispatchResult::reply(reply)
            }
            Kind::SendToMembers => DispatchResult::relay(relay_to_members(frame, sender, peers)),
            _ => DispatchResult::reply(Frame::with_content(
                Kind::Unknown,
                Bytes::from_static(UNKNOWN_COMMAND_MESSAGE.as_bytes()),
            )),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTER_VERSION)
    }
}

/// One mailbox copy per connection whose address the sender listed
fn relay_to_members(frame: &Frame, sender: Ipv4Addr, peers: &[PeerEntry]) -> Vec<Relay> {
    let mut mailbox = Frame::with_content(Kind::ResponseMailbox, frame.content.clone());
    mailbox.addresses.push(sender);

    peers
        .iter()
        .filter(|peer| frame.addresses.contains(&peer.address()))
        .map(|peer| Relay {
            peer: peer.id,
            address: peer.address(),
            frame: mailbox.clone(),
        })
        .collect()
}

/// `ResponseMalformedCommand` carrying the failure label
pub fn malformed_reply(kind: ParseErrorKind) -> Frame {
    let message = format!("{}{}\r\n", MALFORMED_MESSAGE_PREFIX, kind);
    Frame::with_content(Kind::ResponseMalformedCommand, message)
}
