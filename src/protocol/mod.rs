//! Protocol Module
//!
//! Defines the text-based wire protocol spoken between peers and the router.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬────────────┬───┬─────────────────────┬─────────────────┐
//! │ CMD/RES  │ code (1-5) │ _ │ [addr,addr,..._]    │     content     │
//! └──────────┴────────────┴───┴─────────────────────┴─────────────────┘
//! ```
//! The address list is only present on `SendToMembers` (code 2) frames.
//! A frame starting with `GET` is an HTTP probe and gets the status page.
//!
//! ### Kind Codes
//! - 0:      QueryVersion
//! - 1:      QueryMembers
//! - 2:      SendToMembers
//! - 0x7FA6: response-code boundary (codes at or above it use `RES`)
//! - 0x7FA7: ResponseToQuery (terminated by CRLF on the wire)
//! - 0x7FA8: ResponseMailbox
//! - 0x7FA9: ResponseMalformedCommand
//! - 0xFFFF: Unknown
//!
//! ### Framing
//! There is no length header: one transport read is one frame, and a read is
//! never larger than [`MAX_FRAME_SIZE`] bytes.

mod kind;
mod frame;
mod codec;
mod ipv4;

pub use kind::{Direction, Kind, RESPONSE_CODE_BOUNDARY};
pub use frame::{Frame, ParseErrorKind, ParseOutcome};
pub use codec::{decode, encode, frame_body, parse_address_list, MAX_ID_WINDOW};
pub use ipv4::{format_ipv4, parse_ipv4, MAX_ADDRESS_LEN};

/// Largest frame the transport hands to the codec in a single read
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;
