//! IPv6 extension header compression (RFC 6282, Sec 4.2).
//!
//! The compressed form drops the 8-octet length unit in favour of a plain
//! byte count and may drop a trailing Pad1 or PadN option. The decoder pads
//! option-carrying headers back to an 8-octet boundary.

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;

use crate::constants::{EXTENSION_HEADER_ALIGNMENT, EXTENSION_HEADER_FIXED_BYTES, OPTION_PAD1, OPTION_PADN};
use crate::cursor::{FieldReader, FieldWriter};
use crate::error::{Field, LowpanBuildingError, LowpanParsingError, ParseContext};
use crate::nhc::constants::*;
use crate::nhc::{NhcDispatch, extension_id};
use crate::protocol_types::ExtensionHeader;

/// Length of a trailing Pad1/PadN option the decoder would restore byte for byte.
///
/// Zero when the options do not parse cleanly, the header is not aligned or
/// the last option is not padding in its canonical form.
fn elidable_padding(header: &ExtensionHeader) -> usize {
    if !header.kind.carries_options() || !header.is_aligned() {
        return 0;
    }
    let data = &header.data[..];
    let mut offset = 0;
    let mut last = None;
    while offset < data.len() {
        let option_len = match data[offset] {
            OPTION_PAD1 => 1,
            _ => match data.get(offset + 1) {
                Some(&len) => 2 + len as usize,
                None => return 0,
            },
        };
        last = Some((offset, option_len));
        offset += option_len;
    }
    if offset != data.len() {
        return 0;
    }

    match last {
        Some((start, 1)) if data[start] == OPTION_PAD1 => 1,
        Some((start, len))
            if data[start] == OPTION_PADN
                && len < EXTENSION_HEADER_ALIGNMENT
                && data[start + 2..].iter().all(|&b| b == 0) =>
        {
            len
        }
        _ => 0,
    }
}

/// Bytes of `header`'s body the compressed form carries.
fn compressed_body(header: &ExtensionHeader) -> &[u8] {
    &header.data[..header.data.len() - elidable_padding(header)]
}

/// True when `header` fits the 8-bit NHC length field.
pub fn is_compressible(header: &ExtensionHeader) -> bool {
    compressed_body(header).len() <= EXT_NHC_MAX_BODY_LEN
}

/// Writes the NHC form of `header`.
///
/// `next_header_compressed` sets N; when clear the next header byte is
/// carried inline.
///
/// # Errors
/// - [`LowpanBuildingError::InvalidFieldValueForBuild`] - Body longer than 255 bytes
/// - [`LowpanBuildingError::BufferTooSmall`] - `writer` ran out of space
pub fn compress_extension(
    header: &ExtensionHeader,
    next_header_compressed: bool,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    let body = compressed_body(header);
    if body.len() > EXT_NHC_MAX_BODY_LEN {
        return Err(LowpanBuildingError::InvalidFieldValueForBuild {
            field: Field::ExtensionHeaderLength,
            description: "extension header body exceeds 255 bytes",
        });
    }

    let mut dispatch = EXT_NHC_DISPATCH | (extension_id(header.kind) << EXT_NHC_EID_SHIFT);
    if next_header_compressed {
        dispatch |= EXT_NHC_NH_BIT;
    }
    let context = ParseContext::ExtensionNhc;
    writer.put_u8(dispatch, context)?;
    if !next_header_compressed {
        writer.put_u8(header.next_header, context)?;
    }
    writer.put_u8(body.len() as u8, context)?;
    writer.put_slice(body, context)?;

    trace!(
        "extension NHC 0x{:02x} {:?} body {} of {} bytes",
        dispatch,
        header.kind,
        body.len(),
        header.data.len()
    );
    Ok(())
}

/// Appends the canonical padding that brings `body` to an 8-octet boundary.
fn restore_padding(body: &mut BytesMut) {
    let misalignment = (EXTENSION_HEADER_FIXED_BYTES + body.len()) % EXTENSION_HEADER_ALIGNMENT;
    match EXTENSION_HEADER_ALIGNMENT - misalignment {
        EXTENSION_HEADER_ALIGNMENT => {}
        1 => body.put_u8(OPTION_PAD1),
        pad => {
            body.put_u8(OPTION_PADN);
            body.put_u8((pad - 2) as u8);
            body.put_bytes(0, pad - 2);
        }
    }
}

/// Reads an extension header NHC.
///
/// Returns the header and the N flag. With N set the returned
/// `next_header` is zero; the following NHC dispatch determines it.
///
/// # Errors
/// - [`LowpanParsingError::InvalidDispatch`] - Not an extension header NHC
/// - [`LowpanParsingError::UnsupportedExtensionHeader`] - Fragment, mobility or IPv6 EID
/// - [`LowpanParsingError::InvalidFieldValue`] - Routing header not 8-octet aligned
/// - [`LowpanParsingError::NotEnoughData`] - Truncated header
pub fn decompress_extension(
    reader: &mut FieldReader<'_>,
) -> Result<(ExtensionHeader, bool), LowpanParsingError> {
    let context = ParseContext::ExtensionNhc;
    let dispatch = reader.read_u8(context)?;
    let kind = match NhcDispatch::from_byte(dispatch)? {
        NhcDispatch::Extension(kind) => kind,
        NhcDispatch::Udp => {
            return Err(LowpanParsingError::InvalidDispatch {
                discriminator: dispatch,
                context,
            });
        }
    };

    let next_header_compressed = dispatch & EXT_NHC_NH_BIT != 0;
    let next_header = if next_header_compressed {
        0
    } else {
        reader.read_u8(context)?
    };
    let length = reader.read_u8(context)? as usize;
    let mut body = BytesMut::with_capacity(length + EXTENSION_HEADER_ALIGNMENT);
    body.put_slice(reader.read_slice(length, context)?);

    let wire_len = EXTENSION_HEADER_FIXED_BYTES + length;
    if wire_len % EXTENSION_HEADER_ALIGNMENT != 0 {
        if !kind.carries_options() {
            return Err(LowpanParsingError::InvalidFieldValue {
                field: Field::ExtensionHeaderLength,
                expected: wire_len.next_multiple_of(EXTENSION_HEADER_ALIGNMENT) as u32,
                got: wire_len as u32,
            });
        }
        restore_padding(&mut body);
    }

    Ok((
        ExtensionHeader::new(kind, next_header, Bytes::from(body)),
        next_header_compressed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::IP_PROTOCOL_UDP;
    use crate::protocol_types::ExtensionHeaderKind;

    fn compress(header: &ExtensionHeader, next_header_compressed: bool) -> Vec<u8> {
        let mut out = [0u8; 300];
        let mut writer = FieldWriter::new(&mut out);
        compress_extension(header, next_header_compressed, &mut writer).unwrap();
        let written = writer.written();
        out[..written].to_vec()
    }

    #[test]
    fn trailing_padn_is_elided_and_restored() {
        // Router alert (4 bytes) then PadN of 2.
        let header = ExtensionHeader::new(
            ExtensionHeaderKind::HopByHop,
            IP_PROTOCOL_UDP,
            vec![0x05, 0x02, 0x00, 0x00, 0x01, 0x00],
        );
        let bytes = compress(&header, true);
        assert_eq!(bytes, vec![0xe1, 0x04, 0x05, 0x02, 0x00, 0x00]);

        let mut reader = FieldReader::new(&bytes);
        let (decoded, more) = decompress_extension(&mut reader).unwrap();
        assert!(more);
        assert_eq!(decoded.data, header.data);
        assert_eq!(decoded.next_header, 0);
    }

    #[test]
    fn trailing_pad1_is_elided_and_restored() {
        let header = ExtensionHeader::new(
            ExtensionHeaderKind::DestinationOptions,
            IP_PROTOCOL_UDP,
            vec![0x1e, 0x03, 0xaa, 0xbb, 0xcc, 0x00],
        );
        let bytes = compress(&header, false);
        assert_eq!(bytes, vec![0xe6, IP_PROTOCOL_UDP, 0x05, 0x1e, 0x03, 0xaa, 0xbb, 0xcc]);

        let mut reader = FieldReader::new(&bytes);
        let (decoded, more) = decompress_extension(&mut reader).unwrap();
        assert!(!more);
        assert_eq!(decoded, header);
    }

    #[test]
    fn non_canonical_padding_is_kept() {
        // PadN with a non-zero byte would not be rebuilt as is.
        let header = ExtensionHeader::new(
            ExtensionHeaderKind::HopByHop,
            IP_PROTOCOL_UDP,
            vec![0x01, 0x04, 0x00, 0x00, 0x00, 0x07],
        );
        let bytes = compress(&header, false);
        assert_eq!(bytes[2], 6);

        let mut reader = FieldReader::new(&bytes);
        assert_eq!(decompress_extension(&mut reader).unwrap().0, header);
    }

    #[test]
    fn routing_header_must_be_aligned() {
        let mut reader = FieldReader::new(&[0xe2, IP_PROTOCOL_UDP, 0x03, 0x00, 0x01, 0x02]);
        assert_eq!(
            decompress_extension(&mut reader),
            Err(LowpanParsingError::InvalidFieldValue {
                field: Field::ExtensionHeaderLength,
                expected: 8,
                got: 5,
            })
        );
    }

    #[test]
    fn oversized_body_is_not_compressible() {
        let header = ExtensionHeader::new(
            ExtensionHeaderKind::Routing,
            IP_PROTOCOL_UDP,
            vec![0u8; 262],
        );
        assert!(!is_compressible(&header));

        let mut out = [0u8; 300];
        let mut writer = FieldWriter::new(&mut out);
        assert!(matches!(
            compress_extension(&header, false, &mut writer),
            Err(LowpanBuildingError::InvalidFieldValueForBuild {
                field: Field::ExtensionHeaderLength,
                ..
            })
        ));
    }

    #[test]
    fn fragment_eid_is_unsupported() {
        let mut reader = FieldReader::new(&[0xe4, IP_PROTOCOL_UDP, 0x06]);
        assert_eq!(
            decompress_extension(&mut reader),
            Err(LowpanParsingError::UnsupportedExtensionHeader(EID_FRAGMENT))
        );
    }
}
