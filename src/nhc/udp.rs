//! UDP header compression (RFC 6282, Sec 4.3).
//!
//! Ports in the `0xf0b0..=0xf0bf` and `0xf000..=0xf0ff` ranges shrink to a
//! nibble or a byte. The length is always elided and the checksum may be.

use log::trace;

use crate::cursor::{FieldReader, FieldWriter};
use crate::error::{Field, LowpanBuildingError, LowpanParsingError, ParseContext};
use crate::nhc::constants::*;
use crate::protocol_types::UdpHeader;

/// The P field of the UDP NHC dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdpPortEncoding {
    /// 00: both ports inline.
    Inline,
    /// 01: source inline, destination `0xf0XX`.
    DestinationShort,
    /// 10: source `0xf0XX`, destination inline.
    SourceShort,
    /// 11: both ports `0xf0bX`.
    BothNibbles,
}

fn is_short(port: u16) -> bool {
    port & UDP_PORT_SHORT_MASK == UDP_PORT_SHORT_BASE
}

fn is_nibble(port: u16) -> bool {
    port & UDP_PORT_NIBBLE_MASK == UDP_PORT_NIBBLE_BASE
}

impl UdpPortEncoding {
    /// Chooses the shortest encoding for the port pair.
    ///
    /// When both ports are `0xf0XX` the source is the one shortened.
    pub fn select(src_port: u16, dst_port: u16) -> Self {
        if is_nibble(src_port) && is_nibble(dst_port) {
            Self::BothNibbles
        } else if is_short(src_port) {
            Self::SourceShort
        } else if is_short(dst_port) {
            Self::DestinationShort
        } else {
            Self::Inline
        }
    }

    /// True when the port pair can be carried by this encoding.
    pub fn fits(self, src_port: u16, dst_port: u16) -> bool {
        match self {
            Self::Inline => true,
            Self::DestinationShort => is_short(dst_port),
            Self::SourceShort => is_short(src_port),
            Self::BothNibbles => is_nibble(src_port) && is_nibble(dst_port),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Inline => 0b00,
            Self::DestinationShort => 0b01,
            Self::SourceShort => 0b10,
            Self::BothNibbles => 0b11,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & UDP_NHC_PORTS_MASK {
            0b00 => Self::Inline,
            0b01 => Self::DestinationShort,
            0b10 => Self::SourceShort,
            _ => Self::BothNibbles,
        }
    }

    /// Inline port bytes.
    pub fn inline_len(self) -> usize {
        match self {
            Self::Inline => 4,
            Self::DestinationShort | Self::SourceShort => 3,
            Self::BothNibbles => 1,
        }
    }
}

/// Writes the UDP NHC header for `udp` using `ports`.
///
/// # Errors
/// - [`LowpanBuildingError::InvalidFieldValueForBuild`] - A port does not fit `ports`
/// - [`LowpanBuildingError::BufferTooSmall`] - `writer` ran out of space
pub fn compress_udp(
    udp: &UdpHeader,
    ports: UdpPortEncoding,
    elide_checksum: bool,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    if !ports.fits(udp.src_port, udp.dst_port) {
        let field = if ports.fits(udp.src_port, UDP_PORT_NIBBLE_BASE) {
            Field::DestinationPort
        } else {
            Field::SourcePort
        };
        return Err(LowpanBuildingError::InvalidFieldValueForBuild {
            field,
            description: "port outside the range the port encoding elides",
        });
    }

    let mut dispatch = UDP_NHC_DISPATCH | ports.bits();
    if elide_checksum {
        dispatch |= UDP_NHC_CHECKSUM_BIT;
    }
    let context = ParseContext::UdpNhc;
    writer.put_u8(dispatch, context)?;

    let [src_high, src_low] = udp.src_port.to_be_bytes();
    let [dst_high, dst_low] = udp.dst_port.to_be_bytes();
    match ports {
        UdpPortEncoding::Inline => writer.put_slice(&[src_high, src_low, dst_high, dst_low], context)?,
        UdpPortEncoding::DestinationShort => writer.put_slice(&[src_high, src_low, dst_low], context)?,
        UdpPortEncoding::SourceShort => writer.put_slice(&[src_low, dst_high, dst_low], context)?,
        UdpPortEncoding::BothNibbles => {
            writer.put_u8(((src_low & 0x0f) << 4) | (dst_low & 0x0f), context)?
        }
    }

    if !elide_checksum {
        writer.put_u16(udp.checksum, context)?;
    }
    trace!(
        "UDP NHC 0x{:02x} ports {}->{} checksum {}",
        dispatch,
        udp.src_port,
        udp.dst_port,
        if elide_checksum { "elided" } else { "inline" }
    );
    Ok(())
}

/// Fields carried by a UDP NHC header. Length is never carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpNhcFields {
    pub src_port: u16,
    pub dst_port: u16,
    /// `None` when elided; the receiver recomputes it.
    pub checksum: Option<u16>,
}

/// Reads a UDP NHC header.
///
/// # Errors
/// - [`LowpanParsingError::InvalidDispatch`] - Not a UDP NHC dispatch
/// - [`LowpanParsingError::NotEnoughData`] - Truncated ports or checksum
pub fn decompress_udp(reader: &mut FieldReader<'_>) -> Result<UdpNhcFields, LowpanParsingError> {
    let context = ParseContext::UdpNhc;
    let dispatch = reader.read_u8(context)?;
    if dispatch & UDP_NHC_DISPATCH_MASK != UDP_NHC_DISPATCH {
        return Err(LowpanParsingError::InvalidDispatch {
            discriminator: dispatch,
            context,
        });
    }

    let (src_port, dst_port) = match UdpPortEncoding::from_bits(dispatch) {
        UdpPortEncoding::Inline => (reader.read_u16(context)?, reader.read_u16(context)?),
        UdpPortEncoding::DestinationShort => {
            let src = reader.read_u16(context)?;
            (src, UDP_PORT_SHORT_BASE | reader.read_u8(context)? as u16)
        }
        UdpPortEncoding::SourceShort => {
            let src = UDP_PORT_SHORT_BASE | reader.read_u8(context)? as u16;
            (src, reader.read_u16(context)?)
        }
        UdpPortEncoding::BothNibbles => {
            let nibbles = reader.read_u8(context)?;
            (
                UDP_PORT_NIBBLE_BASE | (nibbles >> 4) as u16,
                UDP_PORT_NIBBLE_BASE | (nibbles & 0x0f) as u16,
            )
        }
    };

    let checksum = if dispatch & UDP_NHC_CHECKSUM_BIT != 0 {
        None
    } else {
        Some(reader.read_u16(context)?)
    };

    Ok(UdpNhcFields {
        src_port,
        dst_port,
        checksum,
    })
}
