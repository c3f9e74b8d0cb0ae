//! IPv4 text helpers
//!
//! The wire protocol carries peer addresses in dotted-decimal form.

use std::net::Ipv4Addr;

/// Longest dotted-decimal token accepted (`255.255.255.255`)
pub const MAX_ADDRESS_LEN: usize = 15;

/// Parse a dotted-decimal address.
///
/// Returns `None` for unparsable text and for `0.0.0.0`, which never names a
/// peer.
pub fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    let address: Ipv4Addr = text.parse().ok()?;
    if address.is_unspecified() {
        return None;
    }
    Some(address)
}

/// Format an address in dotted-decimal form
pub fn format_ipv4(address: Ipv4Addr) -> String {
    address.to_string()
}
