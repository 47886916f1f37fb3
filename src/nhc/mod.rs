//! LOWPAN_NHC: compressed headers following IPHC (RFC 6282, Sec 4).
//!
//! The codec compresses UDP and the option-carrying or routing IPv6
//! extension headers. Every other next header travels uncompressed after
//! the IPHC header with NH clear.

use crate::error::{Field, LowpanParsingError, ParseContext};
use crate::protocol_types::ExtensionHeaderKind;

pub mod constants;
pub mod extension;
pub mod udp;

use self::constants::*;

pub use self::extension::{compress_extension, decompress_extension, is_compressible};
pub use self::udp::{UdpNhcFields, UdpPortEncoding, compress_udp, decompress_udp};

/// What an NHC dispatch byte announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NhcDispatch {
    Extension(ExtensionHeaderKind),
    Udp,
}

impl NhcDispatch {
    /// Classifies the first byte of an NHC header.
    ///
    /// # Errors
    /// - [`LowpanParsingError::UnsupportedExtensionHeader`] - Fragment, mobility or IPv6 EID
    /// - [`LowpanParsingError::ReservedEncoding`] - Reserved EID
    /// - [`LowpanParsingError::InvalidDispatch`] - Neither UDP nor extension header NHC
    pub fn from_byte(byte: u8) -> Result<Self, LowpanParsingError> {
        if byte & UDP_NHC_DISPATCH_MASK == UDP_NHC_DISPATCH {
            return Ok(Self::Udp);
        }
        if byte & EXT_NHC_DISPATCH_MASK == EXT_NHC_DISPATCH {
            let eid = (byte & EXT_NHC_EID_MASK) >> EXT_NHC_EID_SHIFT;
            return match eid {
                EID_HOP_BY_HOP => Ok(Self::Extension(ExtensionHeaderKind::HopByHop)),
                EID_ROUTING => Ok(Self::Extension(ExtensionHeaderKind::Routing)),
                EID_DESTINATION_OPTIONS => {
                    Ok(Self::Extension(ExtensionHeaderKind::DestinationOptions))
                }
                EID_FRAGMENT | EID_MOBILITY | EID_IPV6 => {
                    Err(LowpanParsingError::UnsupportedExtensionHeader(eid))
                }
                _ => Err(LowpanParsingError::ReservedEncoding {
                    field: Field::NextHeader,
                    value: eid,
                }),
            };
        }
        Err(LowpanParsingError::InvalidDispatch {
            discriminator: byte,
            context: ParseContext::NhcDispatch,
        })
    }

    /// IPv6 next header value of the header this dispatch stands for.
    pub fn protocol(self) -> u8 {
        match self {
            Self::Extension(kind) => kind.protocol(),
            Self::Udp => crate::constants::IP_PROTOCOL_UDP,
        }
    }
}

/// EID naming `kind` in an extension header NHC dispatch.
pub(crate) fn extension_id(kind: ExtensionHeaderKind) -> u8 {
    match kind {
        ExtensionHeaderKind::HopByHop => EID_HOP_BY_HOP,
        ExtensionHeaderKind::Routing => EID_ROUTING,
        ExtensionHeaderKind::DestinationOptions => EID_DESTINATION_OPTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{IP_PROTOCOL_DESTINATION_OPTIONS, IP_PROTOCOL_UDP};

    #[test]
    fn classifies_udp_dispatches() {
        for byte in 0xf0..=0xf7u8 {
            assert_eq!(NhcDispatch::from_byte(byte), Ok(NhcDispatch::Udp));
        }
        assert_eq!(NhcDispatch::Udp.protocol(), IP_PROTOCOL_UDP);
    }

    #[test]
    fn classifies_extension_dispatches() {
        let dispatch = NhcDispatch::from_byte(0xe7).unwrap();
        assert_eq!(
            dispatch,
            NhcDispatch::Extension(ExtensionHeaderKind::DestinationOptions)
        );
        assert_eq!(dispatch.protocol(), IP_PROTOCOL_DESTINATION_OPTIONS);
        assert_eq!(
            NhcDispatch::from_byte(0xe2),
            Ok(NhcDispatch::Extension(ExtensionHeaderKind::Routing))
        );
    }

    #[test]
    fn rejects_fragment_and_tunneled_ipv6() {
        assert_eq!(
            NhcDispatch::from_byte(0xe4),
            Err(LowpanParsingError::UnsupportedExtensionHeader(EID_FRAGMENT))
        );
        assert_eq!(
            NhcDispatch::from_byte(0xee),
            Err(LowpanParsingError::UnsupportedExtensionHeader(EID_IPV6))
        );
        assert!(matches!(
            NhcDispatch::from_byte(0xea),
            Err(LowpanParsingError::ReservedEncoding { value: 5, .. })
        ));
    }

    #[test]
    fn rejects_unknown_dispatch() {
        assert_eq!(
            NhcDispatch::from_byte(0xf8),
            Err(LowpanParsingError::InvalidDispatch {
                discriminator: 0xf8,
                context: ParseContext::NhcDispatch,
            })
        );
    }
}
