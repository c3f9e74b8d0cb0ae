//! Frame definitions
//!
//! A frame is one protocol message: kind, optional address list and content.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use bytes::Bytes;
use thiserror::Error;

use super::ipv4::parse_ipv4;
use super::kind::{Direction, Kind};
use crate::error::{Result, RouterError};

/// A decoded or encodable protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// `Command` or `Response`, from the prefix
    pub direction: Direction,

    /// Command or response kind
    pub kind: Kind,

    /// Peer addresses; never contains `0.0.0.0`
    pub addresses: Vec<Ipv4Addr>,

    /// Opaque payload. The CRLF ending a `ResponseToQuery` is not part of it.
    pub content: Bytes,
}

impl Frame {
    /// Create an empty frame of the given kind
    pub fn new(kind: Kind) -> Self {
        Self {
            direction: Direction::of(kind),
            kind,
            addresses: Vec::new(),
            content: Bytes::new(),
        }
    }

    /// Create a frame of the given kind carrying `content`
    pub fn with_content(kind: Kind, content: impl Into<Bytes>) -> Self {
        let mut frame = Self::new(kind);
        frame.content = content.into();
        frame
    }

    /// Create a `SendToMembers` command addressed to `targets`
    pub fn send_to_members(targets: &[Ipv4Addr], payload: impl Into<Bytes>) -> Result<Self> {
        if targets.is_empty() {
            return Err(RouterError::InvalidAddress(
                "SendToMembers needs at least one target".to_string(),
            ));
        }
        let mut frame = Self::with_content(Kind::SendToMembers, payload);
        for target in targets {
            frame.add_address(*target)?;
        }
        Ok(frame)
    }

    /// Append an address, rejecting `0.0.0.0`
    pub fn add_address(&mut self, address: Ipv4Addr) -> Result<()> {
        if address.is_unspecified() {
            return Err(RouterError::InvalidAddress(address.to_string()));
        }
        self.addresses.push(address);
        Ok(())
    }

    /// Append an address given in dotted-decimal form
    pub fn add_address_str(&mut self, text: &str) -> Result<()> {
        let address =
            parse_ipv4(text).ok_or_else(|| RouterError::InvalidAddress(text.to_string()))?;
        self.addresses.push(address);
        Ok(())
    }

    /// Append the IPv4 address of a connected peer's endpoint
    pub fn add_peer_address(&mut self, endpoint: SocketAddr) -> Result<()> {
        match endpoint.ip() {
            IpAddr::V4(address) => self.add_address(address),
            IpAddr::V6(_) => Err(RouterError::UnsupportedAddress(endpoint)),
        }
    }

    /// Replace the content
    pub fn set_content(&mut self, content: impl Into<Bytes>) {
        self.content = content.into();
    }
}

/// Why a buffer could not be decoded.
///
/// `Display` yields the label sent back to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseErrorKind {
    /// Buffer too short to hold a prefix and anything after it
    #[error("Invalid Prefix")]
    InvalidPrefix,

    /// First three bytes are not `CMD`, `RES` or `GET`
    #[error("Unknown Prefix")]
    UnknownPrefix,

    /// Missing `_` within the id window, or the id is not a decimal number
    #[error("Invalid Command Id")]
    InvalidCommandId,

    /// `SendToMembers` with nothing after the id
    #[error("SendToMember Malformed.")]
    SendToMemberMalformed,

    /// Bad character, oversized token, zero or unparsable address
    #[error("Malformed IP Address")]
    MalformedIpAddress,

    #[error("General Failure")]
    GeneralFailure,
}

/// Result of one decode attempt; exactly one variant per buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A well-formed `CMD`/`RES` frame
    Success(Frame),

    /// The buffer starts with `GET`; serve the status page
    HttpProbe,

    /// The buffer is malformed
    Failure(ParseErrorKind),
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    /// The decoded frame, if any
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            ParseOutcome::Success(frame) => Some(frame),
            _ => None,
        }
    }

    /// The failure kind, if any
    pub fn error(&self) -> Option<ParseErrorKind> {
        match self {
            ParseOutcome::Failure(kind) => Some(*kind),
            _ => None,
        }
    }
}
