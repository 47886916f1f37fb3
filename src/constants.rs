//! 6LoWPAN protocol constants and bitmasks.
//!
//! Defines values shared across the codec: protocol numbers, fixed header
//! sizes, well-known address bytes and configuration defaults. IPHC and NHC
//! bit layouts live with their respective modules.

// --- Codec Defaults ---

/// UDP checksums are carried unless the link layer is trusted for integrity.
pub const DEFAULT_ELIDE_UDP_CHECKSUM: bool = false;
/// Extension headers are NHC-compressed by default.
pub const DEFAULT_COMPRESS_EXTENSION_HEADERS: bool = true;

/// Number of context slots (a context id is 4 bits).
pub const MAX_CONTEXTS: usize = 16;

// --- Standard Internet Protocol Numbers (IANA Assigned) ---

/// IPv6 Hop-by-Hop Options header.
pub const IP_PROTOCOL_HOP_BY_HOP: u8 = 0;
/// UDP (User Datagram Protocol).
pub const IP_PROTOCOL_UDP: u8 = 17;
/// IPv6 encapsulation.
pub const IP_PROTOCOL_IPV6: u8 = 41;
/// IPv6 Routing header.
pub const IP_PROTOCOL_ROUTING: u8 = 43;
/// IPv6 Fragment header.
pub const IP_PROTOCOL_FRAGMENT: u8 = 44;
/// ICMPv6.
pub const IP_PROTOCOL_ICMPV6: u8 = 58;
/// IPv6 Destination Options header.
pub const IP_PROTOCOL_DESTINATION_OPTIONS: u8 = 60;

// --- General Header Field Constants ---

// IPv6
/// IPv6 version number.
pub const IPV6_VERSION: u8 = 6;
/// Fixed IPv6 header length in bytes.
pub const IPV6_HEADER_LENGTH_BYTES: usize = 40;
/// Length of an IPv6 address in bytes.
pub const IPV6_ADDRESS_LENGTH_BYTES: usize = 16;
/// Length of an interface identifier in bytes.
pub const IID_LENGTH_BYTES: usize = 8;
/// Default hop limit for reconstructed headers that do not carry one.
pub const DEFAULT_IPV6_HOP_LIMIT: u8 = 64;

// UDP
/// UDP header length in bytes (fixed size).
pub const UDP_HEADER_LENGTH_BYTES: usize = 8;

// IPv6 extension headers
/// Fixed part of an extension header (next header + length).
pub const EXTENSION_HEADER_FIXED_BYTES: usize = 2;
/// Extension headers are sized in multiples of this many octets.
pub const EXTENSION_HEADER_ALIGNMENT: usize = 8;
/// Pad1 option type.
pub const OPTION_PAD1: u8 = 0x00;
/// PadN option type.
pub const OPTION_PADN: u8 = 0x01;

// --- Link-layer address derivation (RFC 4944, Sec 6) ---

/// Universal/local bit flipped when an EUI-64 becomes an IID.
pub const EUI64_UL_BIT: u8 = 0x02;
/// Fixed middle of an IID derived from a 16-bit short address.
pub const SHORT_ADDRESS_IID_PREFIX: [u8; 6] = [0x00, 0x00, 0x00, 0xff, 0xfe, 0x00];
/// First 64 bits of a link-local address.
pub const LINK_LOCAL_PREFIX: [u8; 8] = [0xfe, 0x80, 0, 0, 0, 0, 0, 0];
/// First byte of every multicast address.
pub const MULTICAST_PREFIX_BYTE: u8 = 0xff;
/// Flags/scope byte of link-local all-scope multicast (`ff02::`).
pub const MULTICAST_LINK_LOCAL_SCOPE: u8 = 0x02;
