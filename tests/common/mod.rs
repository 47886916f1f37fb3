//! Common test utilities for lowpanstar integration tests.
//!
//! This module provides the node addresses, context tables and header
//! builders shared by the integration tests, plus a codec round-trip helper.

#![allow(dead_code)] // Allow dead code for unused test helpers during development

use std::net::Ipv6Addr;

use lowpanstar::{
    ContextEntry, ContextId, ContextTable, DecompressedHeaders, Ipv6Header, LinkAddresses,
    LowpanCodec, LowpanError, MacAddress, PacketHeaders, UdpHeader,
};

/// Mesh-local prefix installed as context 0.
pub const MESH_LOCAL_PREFIX: &str = "fd00:db8::";

/// Extended address of node A in the reference captures.
pub const NODE_A_EXT: [u8; 8] = [0x14, 0x6e, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x01];
/// Extended address of node B in the reference captures.
pub const NODE_B_EXT: [u8; 8] = [0x14, 0x6e, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x03];

/// Large enough for any single 802.15.4 payload and then some.
pub const FRAME_BUF_SIZE: usize = 1280;

/// Initializes `env_logger` once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn addr(text: &str) -> Ipv6Addr {
    text.parse().expect("test address must parse")
}

/// Frame from node A to node B using extended addresses.
pub fn extended_links() -> LinkAddresses {
    LinkAddresses::new(MacAddress::Extended(NODE_A_EXT), MacAddress::Extended(NODE_B_EXT))
}

/// Frame between two short-addressed nodes.
pub fn short_links(source: u16, destination: u16) -> LinkAddresses {
    LinkAddresses::new(MacAddress::Short(source), MacAddress::Short(destination))
}

/// Table holding only the mesh-local context.
pub fn mesh_local_table() -> ContextTable {
    ContextTable::with_mesh_local_prefix(addr(MESH_LOCAL_PREFIX))
}

/// Mesh-local context plus `2001:db8:1::/48` as context 1 and a /112
/// RLOC-style prefix as context 2.
pub fn thread_table() -> ContextTable {
    let mut table = mesh_local_table();
    table
        .insert(ContextEntry::new(ContextId::new(1), addr("2001:db8:1::"), 48))
        .expect("context 1 must be accepted");
    table
        .insert(ContextEntry::new(ContextId::new(2), addr("fd00:db8::ff:fe00:0"), 112))
        .expect("context 2 must be accepted");
    table
}

/// IPv6 header with the given addresses, ICMPv6, hop limit 64.
pub fn icmp_header(src: Ipv6Addr, dst: Ipv6Addr) -> PacketHeaders {
    PacketHeaders::new(Ipv6Header {
        next_header: 58,
        src,
        dst,
        ..Default::default()
    })
}

/// IPv6 + UDP headers with the given addresses and ports.
pub fn udp_packet(src: Ipv6Addr, dst: Ipv6Addr, src_port: u16, dst_port: u16) -> PacketHeaders {
    PacketHeaders::new(Ipv6Header {
        src,
        dst,
        ..Default::default()
    })
    .with_udp(UdpHeader {
        src_port,
        dst_port,
        length: 0,
        checksum: 0x5a5a,
    })
}

/// Compresses `headers` followed by `payload`, returning the frame bytes.
pub fn compress_frame(
    codec: &LowpanCodec,
    headers: &PacketHeaders,
    payload: &[u8],
    links: &LinkAddresses,
    table: &ContextTable,
) -> Result<Vec<u8>, LowpanError> {
    let mut out = [0u8; FRAME_BUF_SIZE];
    let len = codec.compress_packet(headers, payload, links, table, &mut out)?;
    Ok(out[..len].to_vec())
}

/// Compresses and decompresses, returning the frame and what came back.
pub fn round_trip(
    codec: &LowpanCodec,
    headers: &PacketHeaders,
    payload: &[u8],
    links: &LinkAddresses,
    table: &ContextTable,
) -> (Vec<u8>, DecompressedHeaders) {
    let frame = compress_frame(codec, headers, payload, links, table).expect("compress failed");
    let decompressed = codec
        .decompress(&frame, links, table)
        .expect("decompress failed");
    (frame, decompressed)
}

/// `headers` as the decompressor reports them for `payload_len` payload bytes.
pub fn with_lengths(headers: &PacketHeaders, payload_len: usize) -> PacketHeaders {
    let mut expected = headers.clone();
    expected.set_lengths(payload_len);
    expected
}
