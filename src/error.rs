//! 6LoWPAN header compression error types.
//!
//! This module defines the error types used throughout lowpanstar. Errors are
//! layered the same way as the codec itself: parsing errors raised while
//! reading a compressed stream, building errors raised while emitting one, and
//! the umbrella [`LowpanError`]. Every error maps onto one of the coarse
//! [`ErrorKind`] categories that upper layers count as drop reasons.

use std::fmt;

use thiserror::Error;

use crate::types::ContextId;

/// Header fields referenced by error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    IpVersion,
    Dispatch,
    TrafficFlow,
    NextHeader,
    HopLimit,
    ContextExtension,
    SourceAddress,
    DestinationAddress,
    SourcePort,
    DestinationPort,
    UdpChecksum,
    ExtensionHeaderLength,
    PayloadLength,
    BufferSize,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::IpVersion => "IP version",
            Field::Dispatch => "dispatch",
            Field::TrafficFlow => "traffic class/flow label",
            Field::NextHeader => "next header",
            Field::HopLimit => "hop limit",
            Field::ContextExtension => "context extension",
            Field::SourceAddress => "source address",
            Field::DestinationAddress => "destination address",
            Field::SourcePort => "source port",
            Field::DestinationPort => "destination port",
            Field::UdpChecksum => "UDP checksum",
            Field::ExtensionHeaderLength => "extension header length",
            Field::PayloadLength => "payload length",
            Field::BufferSize => "buffer size",
        };
        f.write_str(name)
    }
}

/// Location within a packet at which parsing or building stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    IphcBase,
    ContextExtension,
    TrafficFlow,
    NextHeader,
    HopLimit,
    SourceAddress,
    DestinationAddress,
    NhcDispatch,
    UdpNhc,
    ExtensionNhc,
    Ipv6Header,
    UdpHeader,
    ExtensionHeader,
    Payload,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseContext::IphcBase => "IPHC base header",
            ParseContext::ContextExtension => "IPHC context extension",
            ParseContext::TrafficFlow => "IPHC traffic class/flow label",
            ParseContext::NextHeader => "IPHC next header",
            ParseContext::HopLimit => "IPHC hop limit",
            ParseContext::SourceAddress => "IPHC source address",
            ParseContext::DestinationAddress => "IPHC destination address",
            ParseContext::NhcDispatch => "NHC dispatch",
            ParseContext::UdpNhc => "UDP NHC",
            ParseContext::ExtensionNhc => "extension header NHC",
            ParseContext::Ipv6Header => "IPv6 header",
            ParseContext::UdpHeader => "UDP header",
            ParseContext::ExtensionHeader => "IPv6 extension header",
            ParseContext::Payload => "payload",
        };
        f.write_str(name)
    }
}

/// Coarse error categories reported to the layer that owns the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or truncated compressed header.
    Parse,
    /// A referenced context id is absent or invalid.
    NotFound,
    /// Destination buffer capacity insufficient.
    NoBufs,
    /// Headers handed to the compressor are inconsistent.
    InvalidArgs,
}

/// Errors raised while reading a compressed or uncompressed header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowpanParsingError {
    /// Insufficient data to parse a complete field or structure.
    #[error("Incomplete packet data: needed {needed} bytes, got {got} for {context}")]
    NotEnoughData {
        needed: usize,
        got: usize,
        context: ParseContext,
    },

    /// The first byte does not carry the `011` IPHC dispatch.
    #[error("Not a LOWPAN_IPHC frame: dispatch byte 0x{0:02X}")]
    NotLowpanFrame(u8),

    /// An NHC dispatch byte that names no known next header encoding.
    #[error("Invalid dispatch 0x{discriminator:02X} for {context}")]
    InvalidDispatch {
        discriminator: u8,
        context: ParseContext,
    },

    /// A bit combination RFC 6282 reserves.
    #[error("Reserved encoding {value} for {field}")]
    ReservedEncoding { field: Field, value: u8 },

    /// Fully elided address without a link-layer address to derive it from.
    #[error("Cannot derive {field} without a link-layer address")]
    MissingLinkAddress { field: Field },

    /// Extension header identifier this codec does not decompress.
    #[error("Unsupported extension header id {0}")]
    UnsupportedExtensionHeader(u8),

    /// A field contained an invalid or unexpected value.
    #[error("Invalid value for {field}: expected {expected}, got {got}")]
    InvalidFieldValue { field: Field, expected: u32, got: u32 },
}

/// Errors raised while emitting a compressed or uncompressed header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowpanBuildingError {
    /// Provided buffer was too small for the bytes being written.
    #[error("Buffer too small: needed {needed} bytes, have {available} for {context}")]
    BufferTooSmall {
        needed: usize,
        available: usize,
        context: ParseContext,
    },

    /// Headers handed to the compressor cannot be encoded as given.
    #[error("Invalid value for {field} during packet building: {description}")]
    InvalidFieldValueForBuild {
        field: Field,
        description: &'static str,
    },
}

/// Main error type for lowpanstar operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowpanError {
    /// Error during header parsing.
    #[error("Parsing error: {0}")]
    Parsing(#[from] LowpanParsingError),

    /// Error during header building.
    #[error("Building error: {0}")]
    Building(#[from] LowpanBuildingError),

    /// The stream references a context id with no valid table entry.
    #[error("Context not found for {0}")]
    ContextNotFound(ContextId),

    /// A context handed to the table cannot be stored.
    #[error("Invalid context {context_id}: {description}")]
    InvalidContext {
        context_id: ContextId,
        description: &'static str,
    },
}

impl LowpanError {
    /// Maps the error onto its drop-reason category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LowpanError::Parsing(_) => ErrorKind::Parse,
            LowpanError::ContextNotFound(_) => ErrorKind::NotFound,
            LowpanError::Building(LowpanBuildingError::BufferTooSmall { .. }) => ErrorKind::NoBufs,
            LowpanError::Building(LowpanBuildingError::InvalidFieldValueForBuild { .. })
            | LowpanError::InvalidContext { .. } => ErrorKind::InvalidArgs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_enough_data_error_display() {
        let err = LowpanParsingError::NotEnoughData {
            needed: 8,
            got: 3,
            context: ParseContext::SourceAddress,
        };
        assert_eq!(
            format!("{}", err),
            "Incomplete packet data: needed 8 bytes, got 3 for IPHC source address"
        );
    }

    #[test]
    fn not_lowpan_frame_error_display() {
        let err = LowpanParsingError::NotLowpanFrame(0x41);
        assert_eq!(format!("{}", err), "Not a LOWPAN_IPHC frame: dispatch byte 0x41");
    }

    #[test]
    fn context_not_found_error_display() {
        let err = LowpanError::ContextNotFound(ContextId::new(7));
        assert_eq!(format!("{}", err), "Context not found for CID7");
    }

    #[test]
    fn lowpan_error_from_parsing_error() {
        let parsing_err = LowpanParsingError::ReservedEncoding {
            field: Field::DestinationAddress,
            value: 2,
        };
        let err = LowpanError::from(parsing_err.clone());
        match err {
            LowpanError::Parsing(inner) => assert_eq!(inner, parsing_err),
            _ => panic!("Incorrect LowpanError variant"),
        }
    }

    #[test]
    fn error_kinds_follow_taxonomy() {
        let parse: LowpanError = LowpanParsingError::NotLowpanFrame(0).into();
        assert_eq!(parse.kind(), ErrorKind::Parse);

        let not_found = LowpanError::ContextNotFound(ContextId::new(3));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let no_bufs: LowpanError = LowpanBuildingError::BufferTooSmall {
            needed: 2,
            available: 1,
            context: ParseContext::IphcBase,
        }
        .into();
        assert_eq!(no_bufs.kind(), ErrorKind::NoBufs);

        let invalid: LowpanError = LowpanBuildingError::InvalidFieldValueForBuild {
            field: Field::SourcePort,
            description: "port outside 0xf0b0..=0xf0bf",
        }
        .into();
        assert_eq!(invalid.kind(), ErrorKind::InvalidArgs);
    }
}
