//! Codec Tests
//!
//! Tests for frame decoding and encoding.

use std::net::Ipv4Addr;

use ptprouter::protocol::{
    decode, encode, frame_body, parse_address_list, Direction, Frame, Kind, ParseErrorKind,
    ParseOutcome,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn decode_ok(bytes: &[u8]) -> Frame {
    match decode(bytes) {
        ParseOutcome::Success(frame) => frame,
        other => panic!("Expected Success for {:?}, got {:?}", String::from_utf8_lossy(bytes), other),
    }
}

fn decode_err(bytes: &[u8]) -> ParseErrorKind {
    match decode(bytes) {
        ParseOutcome::Failure(kind) => kind,
        other => panic!("Expected Failure for {:?}, got {:?}", String::from_utf8_lossy(bytes), other),
    }
}

fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}

// =============================================================================
// Prefix Tests
// =============================================================================

#[test]
fn test_decode_empty_buffer_is_invalid_prefix() {
    assert_eq!(decode_err(b""), ParseErrorKind::InvalidPrefix);
}

#[test]
fn test_decode_three_bytes_is_invalid_prefix() {
    assert_eq!(decode_err(b"CMD"), ParseErrorKind::InvalidPrefix);
    assert_eq!(decode_err(b"RES"), ParseErrorKind::InvalidPrefix);
    assert_eq!(decode_err(b"GET"), ParseErrorKind::InvalidPrefix);
    assert_eq!(decode_err(b"XYZ"), ParseErrorKind::InvalidPrefix);
}

#[test]
fn test_decode_unknown_prefix() {
    assert_eq!(decode_err(b"XYZhello"), ParseErrorKind::UnknownPrefix);
    assert_eq!(decode_err(b"cmd0_"), ParseErrorKind::UnknownPrefix);
    assert_eq!(decode_err(b"POST / HTTP/1.1"), ParseErrorKind::UnknownPrefix);
}

#[test]
fn test_decode_get_is_http_probe() {
    assert_eq!(decode(b"GET / HTTP/1.1\r\nHost: router\r\n\r\n"), ParseOutcome::HttpProbe);
    assert_eq!(decode(b"GETx"), ParseOutcome::HttpProbe);
}

// =============================================================================
// Command Id Tests
// =============================================================================

#[test]
fn test_decode_query_version() {
    assert_eq!(decode(b"CMD0_"), ParseOutcome::Success(Frame::new(Kind::QueryVersion)));
}

#[test]
fn test_decode_query_members() {
    let frame = decode_ok(b"CMD1_");
    assert_eq!(frame.kind, Kind::QueryMembers);
    assert_eq!(frame.direction, Direction::Command);
    assert!(frame.addresses.is_empty());
    assert!(frame.content.is_empty());
}

#[test]
fn test_decode_response_prefix_sets_direction() {
    let frame = decode_ok(b"RES32679_");
    assert_eq!(frame.kind, Kind::ResponseToQuery);
    assert_eq!(frame.direction, Direction::Response);

    // Direction comes from the prefix, not from the kind
    let frame = decode_ok(b"RES0_");
    assert_eq!(frame.kind, Kind::QueryVersion);
    assert_eq!(frame.direction, Direction::Response);
}

#[test]
fn test_decode_trailing_bytes_ignored_for_queries() {
    let frame = decode_ok(b"CMD0_some trailing data");
    assert_eq!(frame.kind, Kind::QueryVersion);
    assert!(frame.content.is_empty());
    assert!(frame.addresses.is_empty());
}

#[test]
fn test_decode_five_digit_id_parses() {
    assert_eq!(decode_ok(b"CMD32680_").kind, Kind::ResponseMailbox);
    assert_eq!(decode_ok(b"CMD00001_").kind, Kind::QueryMembers);
}

#[test]
fn test_decode_six_digit_id_is_invalid() {
    assert_eq!(decode_err(b"CMD123456_"), ParseErrorKind::InvalidCommandId);
    assert_eq!(decode_err(b"CMD000000_"), ParseErrorKind::InvalidCommandId);
}

#[test]
fn test_decode_missing_delimiter_is_invalid() {
    assert_eq!(decode_err(b"CMD0"), ParseErrorKind::InvalidCommandId);
    assert_eq!(decode_err(b"CMD12"), ParseErrorKind::InvalidCommandId);
}

#[test]
fn test_decode_non_numeric_id_is_invalid() {
    assert_eq!(decode_err(b"CMD_"), ParseErrorKind::InvalidCommandId);
    assert_eq!(decode_err(b"CMDab_"), ParseErrorKind::InvalidCommandId);
    assert_eq!(decode_err(b"CMD-1_"), ParseErrorKind::InvalidCommandId);
    assert_eq!(decode_err(b"CMD 1_"), ParseErrorKind::InvalidCommandId);
}

#[test]
fn test_decode_undefined_codes_are_unknown_frames() {
    assert_eq!(decode_ok(b"CMD7_").kind, Kind::Unknown);
    assert_eq!(decode_ok(b"CMD32678_").kind, Kind::Unknown); // the boundary itself
    assert_eq!(decode_ok(b"RES65535_").kind, Kind::Unknown);
    assert_eq!(decode_ok(b"CMD99999_").kind, Kind::Unknown); // wider than u16
}

// =============================================================================
// SendToMembers Tests
// =============================================================================

#[test]
fn test_decode_send_to_members() {
    let frame = decode_ok(b"CMD2_127.0.0.1,10.0.0.5_hello");
    assert_eq!(frame.kind, Kind::SendToMembers);
    assert_eq!(frame.addresses, vec![ip(127, 0, 0, 1), ip(10, 0, 0, 5)]);
    assert_eq!(&frame.content[..], b"hello");
}

#[test]
fn test_decode_send_to_members_single_address_no_content() {
    let frame = decode_ok(b"CMD2_1.2.3.4_");
    assert_eq!(frame.addresses, vec![ip(1, 2, 3, 4)]);
    assert!(frame.content.is_empty());
}

#[test]
fn test_decode_send_to_members_content_may_contain_delimiters() {
    let frame = decode_ok(b"CMD2_1.2.3.4_a_b,c.d_");
    assert_eq!(frame.addresses, vec![ip(1, 2, 3, 4)]);
    assert_eq!(&frame.content[..], b"a_b,c.d_");
}

#[test]
fn test_decode_send_to_members_binary_content() {
    let mut input = b"CMD2_8.8.8.8_".to_vec();
    let payload: Vec<u8> = (0..=255).collect();
    input.extend_from_slice(&payload);

    let frame = decode_ok(&input);
    assert_eq!(&frame.content[..], &payload[..]);
}

#[test]
fn test_decode_send_to_members_on_response_prefix() {
    let frame = decode_ok(b"RES2_9.9.9.9_x");
    assert_eq!(frame.kind, Kind::SendToMembers);
    assert_eq!(frame.direction, Direction::Response);
    assert_eq!(frame.addresses, vec![ip(9, 9, 9, 9)]);
}

#[test]
fn test_decode_send_to_members_without_body() {
    assert_eq!(decode_err(b"CMD2_"), ParseErrorKind::SendToMemberMalformed);
}

#[test]
fn test_decode_send_to_members_malformed_addresses() {
    let cases: &[&[u8]] = &[
        b"CMD2_0.0.0.0_x",       // zero address
        b"CMD2_1.2.3_x",         // too few octets
        b"CMD2_256.1.1.1_x",     // octet out of range
        b"CMD2_1.2.3.4,_x",      // empty token
        b"CMD2__x",              // empty list
        b"CMD2_1.2.3.4;x",       // bad separator
        b"CMD2_a.b.c.d_x",       // letters
        b"CMD2_1.2.3.4",         // unterminated
        b"CMD2_1.2.3.4,5.6.7.8", // unterminated after separator
    ];

    for case in cases {
        assert_eq!(
            decode_err(case),
            ParseErrorKind::MalformedIpAddress,
            "input {:?}",
            String::from_utf8_lossy(case)
        );
    }
}

#[test]
fn test_decode_address_token_cap() {
    // 15 characters is the longest valid token
    let frame = decode_ok(b"CMD2_255.255.255.255_");
    assert_eq!(frame.addresses, vec![ip(255, 255, 255, 255)]);

    // 16 characters is rejected before any parsing
    assert_eq!(decode_err(b"CMD2_1111111111111111_"), ParseErrorKind::MalformedIpAddress);
    assert_eq!(decode_err(b"CMD2_1.1.1.1.1.1.1.1.1_"), ParseErrorKind::MalformedIpAddress);
    assert_eq!(decode_err(b"CMD2_1234567890123456789"), ParseErrorKind::MalformedIpAddress);
}

#[test]
fn test_decode_failures_are_deterministic() {
    let inputs: &[&[u8]] = &[b"CMD", b"XYZhello", b"CMD123456_", b"CMD2_", b"CMD2_1.2.3_x"];
    for input in inputs {
        assert_eq!(decode(input), decode(input));
    }
}

// =============================================================================
// Address List / Body Helpers
// =============================================================================

#[test]
fn test_parse_address_list_reports_consumed_bytes() {
    let (addresses, consumed) = parse_address_list(b"1.2.3.4,5.6.7.8_rest").unwrap();
    assert_eq!(addresses, vec![ip(1, 2, 3, 4), ip(5, 6, 7, 8)]);
    assert_eq!(consumed, 16);
}

#[test]
fn test_frame_body() {
    assert_eq!(frame_body(b"RES32679_1.2.3.4_\r\n"), Some(&b"1.2.3.4_\r\n"[..]));
    assert_eq!(frame_body(b"RES32680_9.9.9.9_hi"), Some(&b"9.9.9.9_hi"[..]));
    assert_eq!(frame_body(b"CMD0_"), Some(&b""[..]));
    assert_eq!(frame_body(b"GET /"), None);
    assert_eq!(frame_body(b"CMDxx"), None);
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_query_commands() {
    assert_eq!(&encode(&Frame::new(Kind::QueryVersion))[..], b"CMD0_");
    assert_eq!(&encode(&Frame::new(Kind::QueryMembers))[..], b"CMD1_");
}

#[test]
fn test_encode_send_to_members() {
    let frame = Frame::send_to_members(&[ip(127, 0, 0, 1), ip(10, 0, 0, 5)], "hello").unwrap();
    assert_eq!(&encode(&frame)[..], b"CMD2_127.0.0.1,10.0.0.5_hello");
}

#[test]
fn test_encode_response_to_query_appends_crlf() {
    let frame = Frame::with_content(Kind::ResponseToQuery, "v1");
    let encoded = encode(&frame);
    assert_eq!(&encoded[..], b"RES32679_v1\r\n");
    assert!(encoded.ends_with(b"\r\n"));
}

#[test]
fn test_encode_members_answer() {
    let mut frame = Frame::new(Kind::ResponseToQuery);
    frame.addresses = vec![ip(127, 0, 0, 1), ip(10, 0, 0, 5)];
    assert_eq!(&encode(&frame)[..], b"RES32679_127.0.0.1,10.0.0.5_\r\n");

    let empty = Frame::new(Kind::ResponseToQuery);
    assert_eq!(&encode(&empty)[..], b"RES32679_\r\n");
}

#[test]
fn test_encode_mailbox() {
    let mut frame = Frame::with_content(Kind::ResponseMailbox, "hello");
    frame.add_address(ip(9, 9, 9, 9)).unwrap();
    assert_eq!(&encode(&frame)[..], b"RES32680_9.9.9.9_hello");
}

#[test]
fn test_encode_unknown() {
    let frame = Frame::with_content(Kind::Unknown, "Unknown Command, cannot process.");
    assert_eq!(&encode(&frame)[..], b"RES65535_Unknown Command, cannot process.");
}

#[test]
fn test_only_response_to_query_ends_with_crlf() {
    let kinds = [
        Kind::QueryVersion,
        Kind::QueryMembers,
        Kind::SendToMembers,
        Kind::ResponseToQuery,
        Kind::ResponseMailbox,
        Kind::ResponseMalformedCommand,
        Kind::Unknown,
    ];

    for kind in kinds {
        let encoded = encode(&Frame::with_content(kind, "v1"));
        assert_eq!(
            encoded.ends_with(b"\r\n"),
            kind == Kind::ResponseToQuery,
            "kind {:?} encoded as {:?}",
            kind,
            String::from_utf8_lossy(&encoded)
        );
    }
}

#[test]
fn test_encode_prefix_follows_kind_not_direction() {
    let mut frame = Frame::new(Kind::QueryVersion);
    frame.direction = Direction::Response;
    assert_eq!(&encode(&frame)[..], b"CMD0_");
}

#[test]
fn test_encode_decode_send_to_members() {
    let frame = Frame::send_to_members(&[ip(192, 168, 1, 10)], "payload_with,delims").unwrap();
    assert_eq!(decode(&encode(&frame)), ParseOutcome::Success(frame));
}
