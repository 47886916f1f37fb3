//! IPv6, IPv6 extension and UDP header (de)serialization.

use std::net::Ipv6Addr;

use bytes::Bytes;

use crate::constants::{
    EXTENSION_HEADER_ALIGNMENT, EXTENSION_HEADER_FIXED_BYTES, IP_PROTOCOL_UDP, IPV6_VERSION,
};
use crate::cursor::{FieldReader, FieldWriter};
use crate::error::{Field, LowpanBuildingError, LowpanParsingError, ParseContext};
use crate::protocol_types::{
    ExtensionHeader, ExtensionHeaderKind, Ipv6Header, PacketHeaders, UdpHeader,
};
use crate::types::FlowLabel;

pub(crate) fn read_ipv6_header(reader: &mut FieldReader<'_>) -> Result<Ipv6Header, LowpanParsingError> {
    let ctx = ParseContext::Ipv6Header;
    let word = u32::from_be_bytes(reader.read_array::<4>(ctx)?);
    let version = (word >> 28) as u8;
    if version != IPV6_VERSION {
        return Err(LowpanParsingError::InvalidFieldValue {
            field: Field::IpVersion,
            expected: IPV6_VERSION as u32,
            got: version as u32,
        });
    }
    let payload_length = reader.read_u16(ctx)?;
    let next_header = reader.read_u8(ctx)?;
    let hop_limit = reader.read_u8(ctx)?;
    let src = Ipv6Addr::from(reader.read_array::<16>(ctx)?);
    let dst = Ipv6Addr::from(reader.read_array::<16>(ctx)?);

    Ok(Ipv6Header {
        traffic_class: (word >> 20) as u8,
        flow_label: FlowLabel::new(word & 0x000F_FFFF),
        payload_length,
        next_header,
        hop_limit,
        src,
        dst,
    })
}

pub(crate) fn write_ipv6_header(
    header: &Ipv6Header,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    let ctx = ParseContext::Ipv6Header;
    let word = ((IPV6_VERSION as u32) << 28)
        | ((header.traffic_class as u32) << 20)
        | header.flow_label.masked().value();
    writer.put_slice(&word.to_be_bytes(), ctx)?;
    writer.put_u16(header.payload_length, ctx)?;
    writer.put_u8(header.next_header, ctx)?;
    writer.put_u8(header.hop_limit, ctx)?;
    writer.put_slice(&header.src.octets(), ctx)?;
    writer.put_slice(&header.dst.octets(), ctx)
}

pub(crate) fn read_udp_header(reader: &mut FieldReader<'_>) -> Result<UdpHeader, LowpanParsingError> {
    let ctx = ParseContext::UdpHeader;
    Ok(UdpHeader {
        src_port: reader.read_u16(ctx)?,
        dst_port: reader.read_u16(ctx)?,
        length: reader.read_u16(ctx)?,
        checksum: reader.read_u16(ctx)?,
    })
}

pub(crate) fn write_udp_header(
    header: &UdpHeader,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    let ctx = ParseContext::UdpHeader;
    writer.put_u16(header.src_port, ctx)?;
    writer.put_u16(header.dst_port, ctx)?;
    writer.put_u16(header.length, ctx)?;
    writer.put_u16(header.checksum, ctx)
}

pub(crate) fn read_extension_header(
    kind: ExtensionHeaderKind,
    reader: &mut FieldReader<'_>,
) -> Result<ExtensionHeader, LowpanParsingError> {
    let ctx = ParseContext::ExtensionHeader;
    let next_header = reader.read_u8(ctx)?;
    let units = reader.read_u8(ctx)? as usize;
    let body_len = (units + 1) * EXTENSION_HEADER_ALIGNMENT - EXTENSION_HEADER_FIXED_BYTES;
    let body = reader.read_slice(body_len, ctx)?;
    Ok(ExtensionHeader::new(kind, next_header, Bytes::copy_from_slice(body)))
}

pub(crate) fn write_extension_header(
    header: &ExtensionHeader,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    let ctx = ParseContext::ExtensionHeader;
    if !header.is_aligned() || header.wire_len() > 256 * EXTENSION_HEADER_ALIGNMENT {
        return Err(LowpanBuildingError::InvalidFieldValueForBuild {
            field: Field::ExtensionHeaderLength,
            description: "extension header is not a whole number of 8-octet units",
        });
    }
    let units = header.wire_len() / EXTENSION_HEADER_ALIGNMENT - 1;
    writer.put_u8(header.next_header, ctx)?;
    writer.put_u8(units as u8, ctx)?;
    writer.put_slice(&header.data, ctx)
}

/// Deserializes a fixed IPv6 header, validating the version.
pub fn deserialize_ipv6_header(data: &[u8]) -> Result<Ipv6Header, LowpanParsingError> {
    read_ipv6_header(&mut FieldReader::new(data))
}

/// Serializes a fixed IPv6 header into `out`, returning the bytes written.
pub fn serialize_ipv6_header(header: &Ipv6Header, out: &mut [u8]) -> Result<usize, LowpanBuildingError> {
    let mut writer = FieldWriter::new(out);
    write_ipv6_header(header, &mut writer)?;
    Ok(writer.written())
}

/// Deserializes a UDP header.
pub fn deserialize_udp_header(data: &[u8]) -> Result<UdpHeader, LowpanParsingError> {
    read_udp_header(&mut FieldReader::new(data))
}

/// Serializes a UDP header into `out`, returning the bytes written.
pub fn serialize_udp_header(header: &UdpHeader, out: &mut [u8]) -> Result<usize, LowpanBuildingError> {
    let mut writer = FieldWriter::new(out);
    write_udp_header(header, &mut writer)?;
    Ok(writer.written())
}

/// Deserializes an extension header of the given kind.
pub fn deserialize_extension_header(
    kind: ExtensionHeaderKind,
    data: &[u8],
) -> Result<ExtensionHeader, LowpanParsingError> {
    read_extension_header(kind, &mut FieldReader::new(data))
}

/// Serializes an extension header into `out`, returning the bytes written.
///
/// # Errors
/// - [`LowpanBuildingError::InvalidFieldValueForBuild`] - Header not 8-octet aligned
/// - [`LowpanBuildingError::BufferTooSmall`] - `out` cannot hold the header
pub fn serialize_extension_header(
    header: &ExtensionHeader,
    out: &mut [u8],
) -> Result<usize, LowpanBuildingError> {
    let mut writer = FieldWriter::new(out);
    write_extension_header(header, &mut writer)?;
    Ok(writer.written())
}

/// Parses the headers at the front of a raw IPv6 datagram.
///
/// Walks hop-by-hop, routing and destination options headers, then a UDP
/// header if one follows. Any other next header ends the walk and is left in
/// the payload.
///
/// # Returns
/// The parsed headers and the offset at which the payload starts.
pub fn deserialize_packet_headers(data: &[u8]) -> Result<(PacketHeaders, usize), LowpanParsingError> {
    let mut reader = FieldReader::new(data);
    let mut headers = PacketHeaders::new(read_ipv6_header(&mut reader)?);

    let mut next_header = headers.ipv6.next_header;
    while let Some(kind) = ExtensionHeaderKind::from_protocol(next_header) {
        let ext = read_extension_header(kind, &mut reader)?;
        next_header = ext.next_header;
        headers.extension_headers.push(ext);
    }
    if next_header == IP_PROTOCOL_UDP {
        headers.udp = Some(read_udp_header(&mut reader)?);
    }

    Ok((headers, reader.consumed()))
}

/// Serializes all headers of `headers` back to back into `out`.
pub fn serialize_packet_headers(
    headers: &PacketHeaders,
    out: &mut [u8],
) -> Result<usize, LowpanBuildingError> {
    let mut writer = FieldWriter::new(out);
    write_ipv6_header(&headers.ipv6, &mut writer)?;
    for ext in &headers.extension_headers {
        write_extension_header(ext, &mut writer)?;
    }
    if let Some(udp) = &headers.udp {
        write_udp_header(udp, &mut writer)?;
    }
    Ok(writer.written())
}
