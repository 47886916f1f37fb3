//! LOWPAN_NHC dispatch layouts (RFC 6282, Sec 4).

/// UDP header encoding: `11110CPP`.
pub const UDP_NHC_DISPATCH: u8 = 0xf0;
pub const UDP_NHC_DISPATCH_MASK: u8 = 0xf8;
/// C: checksum elided.
pub const UDP_NHC_CHECKSUM_BIT: u8 = 0x04;
pub const UDP_NHC_PORTS_MASK: u8 = 0x03;

/// Ports of the form `0xf0XX` carry only their low byte.
pub const UDP_PORT_SHORT_BASE: u16 = 0xf000;
pub const UDP_PORT_SHORT_MASK: u16 = 0xff00;
/// Ports of the form `0xf0bX` carry only their low nibble.
pub const UDP_PORT_NIBBLE_BASE: u16 = 0xf0b0;
pub const UDP_PORT_NIBBLE_MASK: u16 = 0xfff0;

/// IPv6 extension header encoding: `1110EEEN`.
pub const EXT_NHC_DISPATCH: u8 = 0xe0;
pub const EXT_NHC_DISPATCH_MASK: u8 = 0xf0;
pub const EXT_NHC_EID_MASK: u8 = 0x0e;
pub const EXT_NHC_EID_SHIFT: u8 = 1;
/// N: the header after this one is NHC-compressed too.
pub const EXT_NHC_NH_BIT: u8 = 0x01;

// Extension header identifiers.
pub const EID_HOP_BY_HOP: u8 = 0;
pub const EID_ROUTING: u8 = 1;
pub const EID_FRAGMENT: u8 = 2;
pub const EID_DESTINATION_OPTIONS: u8 = 3;
pub const EID_MOBILITY: u8 = 4;
pub const EID_IPV6: u8 = 7;

/// Largest body the 8-bit NHC length field describes.
pub const EXT_NHC_MAX_BODY_LEN: usize = u8::MAX as usize;
