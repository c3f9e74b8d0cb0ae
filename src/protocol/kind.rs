//! Frame kinds
//!
//! Numeric codes identifying commands and responses on the wire.

/// Codes at or above this value are responses and use the `RES` prefix
pub const RESPONSE_CODE_BOUNDARY: u16 = 0x7FA6;

/// Command and response kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Kind {
    /// Ask the router for its version string
    QueryVersion = 0,

    /// Ask the router for every registered peer address
    QueryMembers = 1,

    /// Relay the content to every peer at the listed addresses
    SendToMembers = 2,

    /// Answer to a query, terminated by CRLF on the wire
    ResponseToQuery = RESPONSE_CODE_BOUNDARY + 1,

    /// A payload relayed from another peer
    ResponseMailbox = RESPONSE_CODE_BOUNDARY + 2,

    /// The request could not be parsed
    ResponseMalformedCommand = RESPONSE_CODE_BOUNDARY + 3,

    /// Anything the router does not recognise
    Unknown = 0xFFFF,
}

impl Kind {
    /// The numeric wire code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Map a wire code to a kind. Undefined codes become `Unknown`.
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Kind::QueryVersion,
            1 => Kind::QueryMembers,
            2 => Kind::SendToMembers,
            c if c == Kind::ResponseToQuery.code() => Kind::ResponseToQuery,
            c if c == Kind::ResponseMailbox.code() => Kind::ResponseMailbox,
            c if c == Kind::ResponseMalformedCommand.code() => Kind::ResponseMalformedCommand,
            _ => Kind::Unknown,
        }
    }

    /// Map a parsed decimal id to a kind; values wider than `u16` are `Unknown`
    pub fn from_wire(value: u64) -> Self {
        u16::try_from(value).map_or(Kind::Unknown, Self::from_code)
    }

    /// Whether this kind is encoded with the `RES` prefix
    pub fn is_response(self) -> bool {
        self.code() >= RESPONSE_CODE_BOUNDARY
    }
}

/// Frame direction, carried by the 3-byte prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Command,
    Response,
}

impl Direction {
    pub const COMMAND_PREFIX: &'static [u8; 3] = b"CMD";
    pub const RESPONSE_PREFIX: &'static [u8; 3] = b"RES";

    /// The direction a kind is encoded with
    pub fn of(kind: Kind) -> Self {
        if kind.is_response() {
            Direction::Response
        } else {
            Direction::Command
        }
    }

    pub fn prefix(self) -> &'static [u8; 3] {
        match self {
            Direction::Command => Self::COMMAND_PREFIX,
            Direction::Response => Self::RESPONSE_PREFIX,
        }
    }
}
