//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! <frame>      ::= <cmd-frame> | <http-probe>
//! <cmd-frame>  ::= ("CMD"|"RES") <digits> "_" [<addr-list>] <content>
//! <addr-list>  ::= <ipv4> ("," <ipv4>)* "_"       ; SendToMembers only
//! <http-probe> ::= "GET" ...
//! ```
//!
//! ### Examples
//! - `CMD0_`                          query version
//! - `CMD1_`                          query members
//! - `CMD2_10.0.0.5,10.0.0.6_hello`   relay `hello` to two addresses
//! - `RES32679_1.2.3.4,5.6.7.8_\r\n`  members answer

use std::net::Ipv4Addr;

use bytes::{BufMut, Bytes, BytesMut};

use super::frame::{Frame, ParseErrorKind, ParseOutcome};
use super::ipv4::{format_ipv4, parse_ipv4, MAX_ADDRESS_LEN};
use super::kind::{Direction, Kind};

/// Length of the `CMD`/`RES`/`GET` prefix
const PREFIX_LEN: usize = 3;

/// Bytes scanned for the `_` ending the numeric id (5 digits + delimiter)
pub const MAX_ID_WINDOW: usize = 6;

const HTTP_PREFIX: &[u8; 3] = b"GET";
const DELIMITER: u8 = b'_';
const SEPARATOR: u8 = b',';
const CRLF: &[u8; 2] = b"\r\n";

// =============================================================================
// Cursor
// =============================================================================

/// Read position threaded through the decode steps
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.bytes.len());
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one received buffer.
///
/// Never fails outright: malformed input yields `ParseOutcome::Failure`.
pub fn decode(bytes: &[u8]) -> ParseOutcome {
    if bytes.len() <= PREFIX_LEN {
        return ParseOutcome::Failure(ParseErrorKind::InvalidPrefix);
    }

    let direction = match &bytes[..PREFIX_LEN] {
        p if p == Direction::COMMAND_PREFIX => Direction::Command,
        p if p == Direction::RESPONSE_PREFIX => Direction::Response,
        p if p == HTTP_PREFIX => return ParseOutcome::HttpProbe,
        _ => return ParseOutcome::Failure(ParseErrorKind::UnknownPrefix),
    };

    match decode_frame(direction, Cursor::new(bytes, PREFIX_LEN)) {
        Ok(frame) => ParseOutcome::Success(frame),
        Err(kind) => ParseOutcome::Failure(kind),
    }
}

/// Decode everything after the prefix
fn decode_frame(direction: Direction, mut cursor: Cursor<'_>) -> Result<Frame, ParseErrorKind> {
    let kind = read_kind(&mut cursor)?;

    let mut frame = Frame::new(kind);
    frame.direction = direction;

    // Only relays carry addresses and content; trailing bytes on other kinds are ignored
    if kind == Kind::SendToMembers {
        if cursor.is_empty() {
            return Err(ParseErrorKind::SendToMemberMalformed);
        }
        let (addresses, consumed) = parse_address_list(cursor.remaining())?;
        cursor.advance(consumed);
        frame.addresses = addresses;
        frame.content = Bytes::copy_from_slice(cursor.remaining());
    }

    Ok(frame)
}

/// Read the decimal id and its `_` delimiter
fn read_kind(cursor: &mut Cursor<'_>) -> Result<Kind, ParseErrorKind> {
    let window = &cursor.remaining()[..cursor.remaining().len().min(MAX_ID_WINDOW)];
    let end = window
        .iter()
        .position(|&b| b == DELIMITER)
        .ok_or(ParseErrorKind::InvalidCommandId)?;

    let digits = &window[..end];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ParseErrorKind::InvalidCommandId);
    }

    // At most five digits, cannot overflow
    let value = digits
        .iter()
        .fold(0u64, |acc, &b| acc * 10 + u64::from(b - b'0'));

    cursor.advance(end + 1);
    Ok(Kind::from_wire(value))
}

/// Parse a `_`-terminated, `,`-separated address list.
///
/// Returns the addresses and the number of bytes consumed, terminator
/// included. Everything after the terminator belongs to the caller.
pub fn parse_address_list(bytes: &[u8]) -> Result<(Vec<Ipv4Addr>, usize), ParseErrorKind> {
    let mut addresses = Vec::new();
    let mut token_start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'0'..=b'9' | b'.' => {
                if i - token_start >= MAX_ADDRESS_LEN {
                    return Err(ParseErrorKind::MalformedIpAddress);
                }
            }
            SEPARATOR | DELIMITER => {
                addresses.push(parse_token(&bytes[token_start..i])?);
                if byte == DELIMITER {
                    return Ok((addresses, i + 1));
                }
                token_start = i + 1;
            }
            _ => return Err(ParseErrorKind::MalformedIpAddress),
        }
    }

    // Ran out of input before the terminating `_`
    Err(ParseErrorKind::MalformedIpAddress)
}

fn parse_token(token: &[u8]) -> Result<Ipv4Addr, ParseErrorKind> {
    std::str::from_utf8(token)
        .ok()
        .and_then(parse_ipv4)
        .ok_or(ParseErrorKind::MalformedIpAddress)
}

/// The bytes after the id delimiter of a `CMD`/`RES` frame.
///
/// Query answers and mailbox frames keep their bodies here; `decode` only
/// splits the address list out of `SendToMembers`.
pub fn frame_body(bytes: &[u8]) -> Option<&[u8]> {
    if bytes.len() <= PREFIX_LEN {
        return None;
    }
    let prefix = &bytes[..PREFIX_LEN];
    if prefix != Direction::COMMAND_PREFIX && prefix != Direction::RESPONSE_PREFIX {
        return None;
    }

    let mut cursor = Cursor::new(bytes, PREFIX_LEN);
    read_kind(&mut cursor).ok()?;
    Some(cursor.remaining())
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a frame to bytes
///
/// Format: prefix + code + `_` + [addresses + `_`] + content [+ CRLF]
pub fn encode(frame: &Frame) -> Bytes {
    let code = frame.kind.code().to_string();
    let mut buf = BytesMut::with_capacity(
        PREFIX_LEN + code.len() + 1 + frame.addresses.len() * 16 + frame.content.len() + CRLF.len(),
    );

    buf.put_slice(Direction::of(frame.kind).prefix());
    buf.put_slice(code.as_bytes());
    buf.put_u8(DELIMITER);

    for (i, address) in frame.addresses.iter().enumerate() {
        if i > 0 {
            buf.put_u8(SEPARATOR);
        }
        buf.put_slice(format_ipv4(*address).as_bytes());
    }
    if !frame.addresses.is_empty() {
        buf.put_u8(DELIMITER);
    }

    buf.put_slice(&frame.content);

    if frame.kind == Kind::ResponseToQuery {
        buf.put_slice(CRLF);
    }

    buf.freeze()
}
