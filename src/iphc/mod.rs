//! LOWPAN_IPHC: the compressed IPv6 header (RFC 6282, Sec 3).

pub mod address;
pub mod compressor;
pub mod constants;
pub mod decompressor;
pub mod header;

pub use self::address::{AddressEncoding, MulticastEncoding};
pub use self::compressor::compress_iphc;
pub use self::decompressor::{IphcDecoded, decompress_iphc};
pub use self::header::{HopLimitEncoding, IphcControl, TrafficFlowEncoding};
