//! Router client
//!
//! Blocking client for the wire protocol, used by `ptp-cli` and the tests.
//!
//! The protocol has no length header, so each read is taken as one frame.
//! Mailbox frames that arrive while a query is pending are queued and
//! returned by later `receive_mail` calls.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::error::{Result, RouterError};
use crate::protocol::{
    decode, encode, frame_body, parse_address_list, Frame, Kind, ParseOutcome, MAX_FRAME_SIZE,
};

/// Default time to wait for a query answer
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A payload relayed to this client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// Address of the peer that sent it
    pub sender: Ipv4Addr,

    /// The sender's payload, unmodified
    pub payload: Bytes,
}

/// Blocking connection to a router
pub struct Client {
    stream: TcpStream,
    buffer: Vec<u8>,
    pending: VecDeque<Mail>,
    timeout: Duration,
}

impl Client {
    /// Connect to a router
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            buffer: vec![0u8; MAX_FRAME_SIZE],
            pending: VecDeque::new(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set how long queries wait for an answer
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Ask the router for its version string
    pub fn query_version(&mut self) -> Result<String> {
        self.send_frame(&Frame::new(Kind::QueryVersion))?;
        let body = self.await_query_response()?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Ask the router for the address of every connected peer
    pub fn query_members(&mut self) -> Result<Vec<Ipv4Addr>> {
        self.send_frame(&Frame::new(Kind::QueryMembers))?;
        let body = self.await_query_response()?;
        if body.is_empty() {
            return Ok(Vec::new());
        }

        let (addresses, consumed) = parse_address_list(&body)
            .map_err(|e| RouterError::Protocol(format!("members answer: {}", e)))?;
        if consumed != body.len() {
            return Err(RouterError::Protocol(format!(
                "members answer: {} unexpected trailing bytes",
                body.len() - consumed
            )));
        }
        Ok(addresses)
    }

    /// Relay `payload` to every peer connected from one of `targets`.
    ///
    /// The router does not acknowledge relays.
    pub fn send_to_members(&mut self, targets: &[Ipv4Addr], payload: &[u8]) -> Result<()> {
        let frame = Frame::send_to_members(targets, Bytes::copy_from_slice(payload))?;
        self.send_frame(&frame)
    }

    /// Wait up to `timeout` for a relayed payload
    pub fn receive_mail(&mut self, timeout: Duration) -> Result<Option<Mail>> {
        if let Some(mail) = self.pending.pop_front() {
            return Ok(Some(mail));
        }

        let deadline = Instant::now() + timeout;
        while let Some(received) = self.read_frame(deadline)? {
            match decode(&received) {
                ParseOutcome::Success(frame) if frame.kind == Kind::ResponseMailbox => {
                    return parse_mail(&received).map(Some);
                }
                other => {
                    tracing::debug!("Ignoring unexpected frame while waiting for mail: {:?}", other);
                }
            }
        }
        Ok(None)
    }

    /// Send raw bytes, bypassing the encoder
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read one raw frame, waiting at most the query timeout
    pub fn receive_raw(&mut self) -> Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + self.timeout;
        self.read_frame(deadline)
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send_raw(&encode(frame))
    }

    /// Wait for a `ResponseToQuery` and return its body without the CRLF
    fn await_query_response(&mut self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;

        loop {
            let received = self.read_frame(deadline)?.ok_or_else(|| {
                RouterError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no answer from router",
                ))
            })?;

            let frame = match decode(&received) {
                ParseOutcome::Success(frame) => frame,
                other => {
                    return Err(RouterError::Protocol(format!(
                        "undecodable answer: {:?}",
                        other
                    )))
                }
            };

            let body = frame_body(&received).unwrap_or_default();
            match frame.kind {
                Kind::ResponseToQuery => {
                    let body = body.strip_suffix(b"\r\n").unwrap_or(body);
                    return Ok(body.to_vec());
                }
                Kind::ResponseMailbox => {
                    let mail = parse_mail(&received)?;
                    self.pending.push_back(mail);
                }
                Kind::ResponseMalformedCommand | Kind::Unknown => {
                    let message = String::from_utf8_lossy(body);
                    return Err(RouterError::Rejected(message.trim_end().to_string()));
                }
                other => {
                    return Err(RouterError::Protocol(format!(
                        "unexpected answer kind {:?}",
                        other
                    )))
                }
            }
        }
    }

    /// One read, or `None` once `deadline` passes
    fn read_frame(&mut self, deadline: Instant) -> Result<Option<Vec<u8>>> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.stream.set_read_timeout(Some(remaining))?;

            match self.stream.read(&mut self.buffer) {
                Ok(0) => {
                    return Err(RouterError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "router closed the connection",
                    )))
                }
                Ok(n) => return Ok(Some(self.buffer[..n].to_vec())),
                Err(ref e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                    ) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Split a mailbox frame into sender and payload
fn parse_mail(received: &[u8]) -> Result<Mail> {
    let body = frame_body(received)
        .ok_or_else(|| RouterError::Protocol("mailbox frame without body".to_string()))?;
    let (addresses, consumed) = parse_address_list(body)
        .map_err(|e| RouterError::Protocol(format!("mailbox sender: {}", e)))?;
    let sender = *addresses
        .first()
        .ok_or_else(|| RouterError::Protocol("mailbox frame without sender".to_string()))?;

    Ok(Mail {
        sender,
        payload: Bytes::copy_from_slice(&body[consumed..]),
    })
}
