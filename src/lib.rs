//! `lowpanstar`: 6LoWPAN IPHC/NHC header compression (RFC 6282) in Rust.
//!
//! This library compresses IPv6, IPv6 extension and UDP headers into the
//! bit-packed LOWPAN_IPHC form carried by IEEE 802.15.4 frames, and rebuilds
//! them on receipt. The primary entry point is the [`LowpanCodec`].
//!
//! ## Core Concepts
//!
//! - **[`LowpanCodec`]**: Stateless compressor and decompressor. Every call
//!   receives the frame's link-layer addresses and a view of the contexts.
//! - **Contexts**: Prefixes shared by every node of a network, numbered 0 to
//!   15, that let addresses outside `fe80::/64` shrink too. Stored in a
//!   [`ContextTable`] and read through the [`ContextLookup`] trait.
//! - **Link addresses**: The 802.15.4 source and destination of the frame,
//!   from which fully elided interface identifiers are derived.
//!
//! ## Quick Start
//!
//! ```rust
//! use lowpanstar::{
//!     ContextTable, Ipv6Header, LinkAddresses, LowpanCodec, LowpanConfig, MacAddress,
//!     PacketHeaders, UdpHeader,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let codec = LowpanCodec::new(LowpanConfig::default());
//!     let contexts = ContextTable::with_mesh_local_prefix("fd00:db8::".parse()?);
//!
//!     let local = MacAddress::Extended([0x14, 0x6e, 0x0a, 0, 0, 0, 0, 0x01]);
//!     let peer = MacAddress::Short(0xfc00);
//!
//!     // A CoAP message to the leader's mesh-local address
//!     let headers = PacketHeaders::new(Ipv6Header {
//!         src: "fe80::166e:a00:0:1".parse()?,
//!         dst: "fd00:db8::ff:fe00:fc00".parse()?,
//!         ..Default::default()
//!     })
//!     .with_udp(UdpHeader {
//!         src_port: 5683,
//!         dst_port: 5683,
//!         checksum: 0x1d2e,
//!         ..Default::default()
//!     });
//!     let payload = b"coap";
//!
//!     let mut frame = [0u8; 127];
//!     let len = codec.compress_packet(
//!         &headers,
//!         payload,
//!         &LinkAddresses::outbound(local, peer),
//!         &contexts,
//!         &mut frame,
//!     )?;
//!     println!("Compressed frame: {} bytes", len);
//!
//!     // On the receiving node
//!     let received = codec.decompress(&frame[..len], &LinkAddresses::inbound(peer, local), &contexts)?;
//!     assert_eq!(received.ipv6().dst, headers.ipv6.dst);
//!     assert_eq!(received.payload(&frame[..len]), payload);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Encodings
//!
//! - **IPHC**: every traffic class/flow label, hop limit and address mode,
//!   stateless and context-based, including RFC 3306 multicast
//! - **NHC**: UDP with port and checksum compression; hop-by-hop, routing and
//!   destination options extension headers

pub mod checksum;
pub mod config;
pub mod constants;
pub mod context_manager;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod iphc;
pub mod mac;
pub mod nhc;
pub mod protocol_types;
pub mod serialization;
pub mod traits;
pub mod types;

pub use config::LowpanConfig;
pub use context_manager::{ContextEntry, ContextTable};
pub use engine::{DecompressedHeaders, LowpanCodec};
pub use error::{
    ErrorKind, Field, LowpanBuildingError, LowpanError, LowpanParsingError, ParseContext,
};
pub use mac::{LinkAddresses, MacAddress};
pub use protocol_types::{
    ExtensionHeader, ExtensionHeaderKind, Ipv6Header, PacketHeaders, UdpHeader,
};
pub use traits::ContextLookup;
pub use types::{ContextId, FlowLabel};
pub mod fuzz_harnesses;
