//! Uncompressed header serialization.
//!
//! Converts between raw IPv6/extension/UDP header bytes and the structures in
//! [`crate::protocol_types`]. The codec works on structures; these helpers
//! sit at the boundary with callers that hold whole datagrams.

pub mod headers;

pub use headers::{
    deserialize_extension_header, deserialize_ipv6_header, deserialize_packet_headers,
    deserialize_udp_header, serialize_extension_header, serialize_ipv6_header,
    serialize_packet_headers, serialize_udp_header,
};
