//! Uncompressed protocol header types handled by the codec.
//!
//! These structures are the input of compression and the output of
//! decompression: the fixed IPv6 header, an optional chain of IPv6 extension
//! headers and an optional UDP header. Length fields are kept so callers can
//! hand over headers parsed straight off the wire, but the compressed form
//! never carries them and decompression recomputes them.

use std::net::Ipv6Addr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::constants::{
    DEFAULT_IPV6_HOP_LIMIT, EXTENSION_HEADER_ALIGNMENT, EXTENSION_HEADER_FIXED_BYTES,
    IP_PROTOCOL_DESTINATION_OPTIONS, IP_PROTOCOL_HOP_BY_HOP, IP_PROTOCOL_ROUTING, IP_PROTOCOL_UDP,
    IPV6_HEADER_LENGTH_BYTES, UDP_HEADER_LENGTH_BYTES,
};
use crate::types::FlowLabel;

/// The fixed 40-byte IPv6 header.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Header {
    /// Traffic class: DSCP in the upper six bits, ECN in the lower two.
    pub traffic_class: u8,
    /// Flow label (20 bits).
    pub flow_label: FlowLabel,
    /// Length of everything after the fixed header.
    pub payload_length: u16,
    /// Protocol number of the header that follows.
    pub next_header: u8,
    /// Hop limit.
    pub hop_limit: u8,
    /// Source address.
    #[serde_as(as = "DisplayFromStr")]
    pub src: Ipv6Addr,
    /// Destination address.
    #[serde_as(as = "DisplayFromStr")]
    pub dst: Ipv6Addr,
}

impl Default for Ipv6Header {
    fn default() -> Self {
        Self {
            traffic_class: 0,
            flow_label: FlowLabel::new(0),
            payload_length: 0,
            next_header: IP_PROTOCOL_UDP,
            hop_limit: DEFAULT_IPV6_HOP_LIMIT,
            src: Ipv6Addr::UNSPECIFIED,
            dst: Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Ipv6Header {
    /// Differentiated Services Code Point.
    pub fn dscp(&self) -> u8 {
        self.traffic_class >> 2
    }

    /// Explicit Congestion Notification.
    pub fn ecn(&self) -> u8 {
        self.traffic_class & 0x03
    }
}

/// The 8-byte UDP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    /// Header plus payload length.
    pub length: u16,
    pub checksum: u16,
}

/// IPv6 extension headers the NHC extension encoding supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionHeaderKind {
    HopByHop,
    Routing,
    DestinationOptions,
}

impl ExtensionHeaderKind {
    /// Maps an IPv6 next header value onto a supported extension header.
    pub fn from_protocol(protocol: u8) -> Option<Self> {
        match protocol {
            IP_PROTOCOL_HOP_BY_HOP => Some(Self::HopByHop),
            IP_PROTOCOL_ROUTING => Some(Self::Routing),
            IP_PROTOCOL_DESTINATION_OPTIONS => Some(Self::DestinationOptions),
            _ => None,
        }
    }

    /// IPv6 next header value naming this extension header.
    pub fn protocol(self) -> u8 {
        match self {
            Self::HopByHop => IP_PROTOCOL_HOP_BY_HOP,
            Self::Routing => IP_PROTOCOL_ROUTING,
            Self::DestinationOptions => IP_PROTOCOL_DESTINATION_OPTIONS,
        }
    }

    /// True for the option-carrying headers whose padding can be restored.
    pub fn carries_options(self) -> bool {
        matches!(self, Self::HopByHop | Self::DestinationOptions)
    }
}

/// An IPv6 extension header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHeader {
    pub kind: ExtensionHeaderKind,
    /// Protocol number of the header that follows.
    pub next_header: u8,
    /// Header body after the next header and length bytes, padding included.
    pub data: Bytes,
}

impl ExtensionHeader {
    pub fn new(kind: ExtensionHeaderKind, next_header: u8, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            next_header,
            data: data.into(),
        }
    }

    /// Uncompressed size in bytes.
    pub fn wire_len(&self) -> usize {
        EXTENSION_HEADER_FIXED_BYTES + self.data.len()
    }

    /// True when the uncompressed size is a whole number of 8-octet units.
    pub fn is_aligned(&self) -> bool {
        self.wire_len() % EXTENSION_HEADER_ALIGNMENT == 0
    }
}

/// Everything in front of the payload of a single packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PacketHeaders {
    pub ipv6: Ipv6Header,
    /// Extension headers in wire order.
    pub extension_headers: Vec<ExtensionHeader>,
    /// UDP header, when the packet is a UDP datagram to be NHC-compressed.
    pub udp: Option<UdpHeader>,
}

impl PacketHeaders {
    pub fn new(ipv6: Ipv6Header) -> Self {
        Self {
            ipv6,
            extension_headers: Vec::new(),
            udp: None,
        }
    }

    /// Attaches a UDP header.
    pub fn with_udp(mut self, udp: UdpHeader) -> Self {
        self.udp = Some(udp);
        self
    }

    /// Appends an extension header to the chain.
    pub fn with_extension_header(mut self, header: ExtensionHeader) -> Self {
        self.extension_headers.push(header);
        self
    }

    /// Size of all headers once uncompressed.
    pub fn uncompressed_len(&self) -> usize {
        IPV6_HEADER_LENGTH_BYTES
            + self
                .extension_headers
                .iter()
                .map(ExtensionHeader::wire_len)
                .sum::<usize>()
            + self.udp.map_or(0, |_| UDP_HEADER_LENGTH_BYTES)
    }

    /// Recomputes the IPv6 payload length and UDP length for `payload_len`
    /// bytes following the headers.
    pub fn set_lengths(&mut self, payload_len: usize) {
        let after_fixed = self.uncompressed_len() - IPV6_HEADER_LENGTH_BYTES + payload_len;
        self.ipv6.payload_length = after_fixed as u16;
        if let Some(udp) = self.udp.as_mut() {
            udp.length = (UDP_HEADER_LENGTH_BYTES + payload_len) as u16;
        }
    }
}
