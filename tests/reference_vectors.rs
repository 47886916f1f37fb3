//! Reference frames captured from interoperating Thread nodes.
//!
//! Each test pins the exact compressed bytes and checks both directions.

mod common;

use common::*;
use lowpanstar::{ContextId, ErrorKind, LowpanCodec, LowpanError, MacAddress};

const ECHO_PAYLOAD: [u8; 16] = [
    0x80, 0x00, 0x30, 0xbe, 0x00, 0x00, 0x00, 0x00, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
];

/// fe80::166e:a00:0:1 -> fe80::166e:a00:0:3, ICMPv6 echo request, hop limit 64.
const LL64_ECHO_DATAGRAM_HEADER: [u8; 40] = [
    0x60, 0x00, 0x00, 0x00, 0x00, 0x10, 0x3a, 0x40, 0xfe, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x16, 0x6e, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x01, 0xfe, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x16, 0x6e, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x03,
];

fn ll64_echo_datagram() -> Vec<u8> {
    let mut datagram = LL64_ECHO_DATAGRAM_HEADER.to_vec();
    datagram.extend_from_slice(&ECHO_PAYLOAD);
    datagram
}

fn ll64_echo_frame() -> Vec<u8> {
    let mut frame = vec![0x7a, 0x33, 0x3a];
    frame.extend_from_slice(&ECHO_PAYLOAD);
    frame
}

#[test]
fn ll64_echo_request_compresses_to_reference_frame() {
    init_logging();
    let codec = LowpanCodec::default();
    let mut out = [0u8; FRAME_BUF_SIZE];
    let len = codec
        .compress_datagram(&ll64_echo_datagram(), &extended_links(), &mesh_local_table(), &mut out)
        .unwrap();
    assert_eq!(&out[..len], &ll64_echo_frame()[..]);
}

#[test]
fn ll64_echo_request_decompresses_to_reference_datagram() {
    init_logging();
    let codec = LowpanCodec::default();
    let frame = ll64_echo_frame();
    let decompressed = codec
        .decompress(&frame, &extended_links(), &mesh_local_table())
        .unwrap();
    assert_eq!(decompressed.consumed, 3);
    assert_eq!(decompressed.ipv6().payload_length, 16);
    assert_eq!(decompressed.ipv6().src, addr("fe80::166e:a00:0:1"));
    assert_eq!(decompressed.ipv6().dst, addr("fe80::166e:a00:0:3"));
    assert!(decompressed.udp().is_none());

    let datagram = codec
        .decompress_to_vec(&frame, &extended_links(), &mesh_local_table())
        .unwrap();
    assert_eq!(datagram, ll64_echo_datagram());
}

#[test]
fn ll16_ping_between_short_addresses() {
    init_logging();
    let codec = LowpanCodec::default();
    let links = short_links(0x0000, 0x1000);
    let headers = icmp_header(addr("fe80::ff:fe00:0"), addr("fe80::ff:fe00:1000"));
    let payload = [0x80, 0x00, 0x63, 0x9e, 0x00, 0x00, 0x00, 0x00];

    let (frame, decompressed) = round_trip(&codec, &headers, &payload, &links, &mesh_local_table());
    assert_eq!(
        frame,
        vec![0x7a, 0x33, 0x3a, 0x80, 0x00, 0x63, 0x9e, 0x00, 0x00, 0x00, 0x00]
    );
    assert_eq!(decompressed.headers, with_lengths(&headers, payload.len()));
    assert_eq!(decompressed.ipv6().payload_length, 8);
}

#[test]
fn all_nodes_multicast_uses_one_byte() {
    init_logging();
    let codec = LowpanCodec::default();
    let headers = icmp_header(addr("fe80::166e:a00:0:1"), addr("ff02::1"));

    let (frame, decompressed) = round_trip(&codec, &headers, &[], &extended_links(), &mesh_local_table());
    assert_eq!(frame, vec![0x7a, 0x3b, 0x3a, 0x01]);
    assert_eq!(decompressed.ipv6().dst, addr("ff02::1"));
}

#[test]
fn unknown_context_id_is_not_found() {
    init_logging();
    let codec = LowpanCodec::default();
    // CID=1 with the source naming context 7, nothing else installed.
    let frame = [0x7a, 0xf3, 0x70, 0x3a];
    let err = codec
        .decompress(&frame, &extended_links(), &mesh_local_table())
        .unwrap_err();
    assert_eq!(err, LowpanError::ContextNotFound(ContextId::new(7)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn truncated_inline_address_is_parse_error() {
    init_logging();
    let codec = LowpanCodec::default();
    // SAM=01 promises an 8-byte IID; the frame ends after three.
    let frame = [0x7a, 0x13, 0x3a, 0x02, 0x00, 0x00];
    let err = codec
        .decompress(&frame, &extended_links(), &mesh_local_table())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn link_addresses_are_per_call() {
    init_logging();
    let codec = LowpanCodec::default();
    let frame = ll64_echo_frame();
    let other = lowpanstar::LinkAddresses::new(MacAddress::Short(0x0001), MacAddress::Short(0x0002));
    let decompressed = codec.decompress(&frame, &other, &mesh_local_table()).unwrap();
    assert_eq!(decompressed.ipv6().src, addr("fe80::ff:fe00:1"));
    assert_eq!(decompressed.ipv6().dst, addr("fe80::ff:fe00:2"));
}
