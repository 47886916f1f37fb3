//! The 6LoWPAN header compression engine.
//!
//! This module provides [`LowpanCodec`], which sequences the IPHC and NHC
//! codecs over a single packet. It owns no per-flow state: every call gets
//! the link-layer addresses of the frame and a read-only view of the shared
//! compression contexts.

use log::{debug, trace};

use crate::checksum::udp_checksum;
use crate::config::LowpanConfig;
use crate::constants::{IP_PROTOCOL_UDP, IPV6_HEADER_LENGTH_BYTES};
use crate::cursor::{FieldReader, FieldWriter};
use crate::error::{Field, LowpanBuildingError, LowpanError, LowpanParsingError, ParseContext};
use crate::iphc::{IphcDecoded, compress_iphc, decompress_iphc};
use crate::mac::LinkAddresses;
use crate::nhc::{
    NhcDispatch, UdpPortEncoding, compress_extension, compress_udp, decompress_extension,
    decompress_udp, is_compressible,
};
use crate::protocol_types::{Ipv6Header, PacketHeaders, UdpHeader};
use crate::serialization::headers::{write_extension_header, write_udp_header};
use crate::serialization::{deserialize_packet_headers, serialize_packet_headers};
use crate::traits::ContextLookup;

/// Headers rebuilt from a compressed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressedHeaders {
    /// Rebuilt headers with payload length, UDP length and any elided
    /// UDP checksum recomputed.
    pub headers: PacketHeaders,
    /// Bytes of the frame taken by compressed headers. The payload starts here.
    pub consumed: usize,
}

impl DecompressedHeaders {
    pub fn ipv6(&self) -> &Ipv6Header {
        &self.headers.ipv6
    }

    pub fn udp(&self) -> Option<&UdpHeader> {
        self.headers.udp.as_ref()
    }

    /// The part of `frame` that follows the compressed headers.
    pub fn payload<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        frame.get(self.consumed..).unwrap_or_default()
    }
}

/// Stateless RFC 6282 compressor and decompressor.
///
/// ## Usage
///
/// 1. Create a codec with [`LowpanCodec::new`]
/// 2. Compress outgoing headers with [`compress`] or [`compress_packet`]
/// 3. Rebuild incoming headers with [`decompress`] or [`decompress_to_vec`]
///
/// [`compress`]: Self::compress
/// [`compress_packet`]: Self::compress_packet
/// [`decompress`]: Self::decompress
/// [`decompress_to_vec`]: Self::decompress_to_vec
#[derive(Debug, Clone, Default)]
pub struct LowpanCodec {
    config: LowpanConfig,
}

impl LowpanCodec {
    pub fn new(config: LowpanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LowpanConfig {
        &self.config
    }

    /// Compresses `headers` into `out`.
    ///
    /// Extension headers the NHC encoding cannot carry, and everything
    /// after them, follow the IPHC header uncompressed.
    ///
    /// # Parameters
    /// - `headers`: Headers to compress. Length fields are ignored.
    /// - `links`: Link-layer addresses of the outgoing frame.
    /// - `contexts`: Compression contexts shared with the receivers.
    /// - `out`: Destination buffer.
    ///
    /// # Returns
    /// The number of bytes written to `out`.
    ///
    /// # Errors
    /// - [`LowpanError::Building`] - `out` too small, or the next header chain
    ///   does not match the supplied headers
    pub fn compress(
        &self,
        headers: &PacketHeaders,
        links: &LinkAddresses,
        contexts: &dyn ContextLookup,
        out: &mut [u8],
    ) -> Result<usize, LowpanError> {
        let mut writer = FieldWriter::new(out);
        self.write_headers(headers, links, contexts, &mut writer)?;
        Ok(writer.written())
    }

    /// Compresses `headers` and appends `payload` after them.
    ///
    /// # Returns
    /// The number of bytes written to `out`.
    ///
    /// # Errors
    /// Same as [`compress`](Self::compress).
    pub fn compress_packet(
        &self,
        headers: &PacketHeaders,
        payload: &[u8],
        links: &LinkAddresses,
        contexts: &dyn ContextLookup,
        out: &mut [u8],
    ) -> Result<usize, LowpanError> {
        let mut writer = FieldWriter::new(out);
        self.write_headers(headers, links, contexts, &mut writer)?;
        writer.put_slice(payload, ParseContext::Payload)?;
        Ok(writer.written())
    }

    /// Compresses a raw IPv6 datagram.
    ///
    /// # Errors
    /// - [`LowpanError::Parsing`] - `datagram` is not a well-formed IPv6 packet
    /// - Otherwise as [`compress`](Self::compress)
    pub fn compress_datagram(
        &self,
        datagram: &[u8],
        links: &LinkAddresses,
        contexts: &dyn ContextLookup,
        out: &mut [u8],
    ) -> Result<usize, LowpanError> {
        let (headers, offset) = deserialize_packet_headers(datagram)?;
        self.compress_packet(&headers, &datagram[offset..], links, contexts, out)
    }

    fn write_headers(
        &self,
        headers: &PacketHeaders,
        links: &LinkAddresses,
        contexts: &dyn ContextLookup,
        writer: &mut FieldWriter<'_>,
    ) -> Result<(), LowpanError> {
        validate_chain(headers)?;

        let extensions = &headers.extension_headers;
        let compressed_extensions = if self.config.compress_extension_headers {
            extensions.iter().take_while(|ext| is_compressible(ext)).count()
        } else {
            0
        };
        if compressed_extensions < extensions.len() {
            debug!(
                "Carrying {} of {} extension headers uncompressed",
                extensions.len() - compressed_extensions,
                extensions.len()
            );
        }
        let compressed_udp = headers.udp.filter(|_| compressed_extensions == extensions.len());

        let next_header_compressed = compressed_extensions > 0 || compressed_udp.is_some();
        compress_iphc(&headers.ipv6, next_header_compressed, links, contexts, writer)?;

        for (index, ext) in extensions[..compressed_extensions].iter().enumerate() {
            let next_compressed = if index + 1 < compressed_extensions {
                true
            } else {
                compressed_udp.is_some()
            };
            compress_extension(ext, next_compressed, writer)?;
        }

        match compressed_udp {
            Some(udp) => {
                let ports = UdpPortEncoding::select(udp.src_port, udp.dst_port);
                compress_udp(&udp, ports, self.config.elide_udp_checksum, writer)?;
            }
            None => {
                for ext in &extensions[compressed_extensions..] {
                    write_extension_header(ext, writer)?;
                }
                if let Some(udp) = &headers.udp {
                    write_udp_header(udp, writer)?;
                }
            }
        }

        trace!(
            "Compressed {} header bytes into {}",
            headers.uncompressed_len(),
            writer.written()
        );
        Ok(())
    }

    /// Rebuilds the headers at the front of a compressed frame.
    ///
    /// # Parameters
    /// - `data`: The frame payload, starting with the IPHC dispatch.
    /// - `links`: Link-layer addresses of the received frame.
    /// - `contexts`: Compression contexts shared with the sender.
    ///
    /// # Returns
    /// The rebuilt headers and the offset at which the raw payload starts.
    ///
    /// # Errors
    /// - [`LowpanError::Parsing`] - Malformed, truncated or reserved encoding
    /// - [`LowpanError::ContextNotFound`] - The frame names an unknown context
    pub fn decompress(
        &self,
        data: &[u8],
        links: &LinkAddresses,
        contexts: &dyn ContextLookup,
    ) -> Result<DecompressedHeaders, LowpanError> {
        read_headers(data, links, contexts).inspect_err(|err| {
            debug!("Dropping 6LoWPAN frame ({:?}): {}", err.kind(), err);
        })
    }

    /// Rebuilds the complete uncompressed IPv6 packet carried by `data`.
    ///
    /// # Errors
    /// Same as [`decompress`](Self::decompress).
    pub fn decompress_to_vec(
        &self,
        data: &[u8],
        links: &LinkAddresses,
        contexts: &dyn ContextLookup,
    ) -> Result<Vec<u8>, LowpanError> {
        let decompressed = self.decompress(data, links, contexts)?;
        let payload = decompressed.payload(data);
        let mut packet = vec![0u8; decompressed.headers.uncompressed_len() + payload.len()];
        let written = serialize_packet_headers(&decompressed.headers, &mut packet)?;
        packet[written..].copy_from_slice(payload);
        Ok(packet)
    }
}

/// Checks that every next header value names the header that follows it.
fn validate_chain(headers: &PacketHeaders) -> Result<(), LowpanBuildingError> {
    let mut next_header = headers.ipv6.next_header;
    for ext in &headers.extension_headers {
        if next_header != ext.kind.protocol() {
            return Err(LowpanBuildingError::InvalidFieldValueForBuild {
                field: Field::NextHeader,
                description: "next header does not name the following extension header",
            });
        }
        if !ext.is_aligned() {
            return Err(LowpanBuildingError::InvalidFieldValueForBuild {
                field: Field::ExtensionHeaderLength,
                description: "extension header is not a whole number of 8-octet units",
            });
        }
        next_header = ext.next_header;
    }
    if headers.udp.is_some() && next_header != IP_PROTOCOL_UDP {
        return Err(LowpanBuildingError::InvalidFieldValueForBuild {
            field: Field::NextHeader,
            description: "UDP header supplied but the last next header is not UDP",
        });
    }
    Ok(())
}

fn read_headers(
    data: &[u8],
    links: &LinkAddresses,
    contexts: &dyn ContextLookup,
) -> Result<DecompressedHeaders, LowpanError> {
    let mut reader = FieldReader::new(data);
    let IphcDecoded {
        ipv6,
        next_header_compressed,
    } = decompress_iphc(&mut reader, links, contexts)?;
    let mut headers = PacketHeaders::new(ipv6);

    let mut pending = next_header_compressed;
    let mut checksum_elided = false;
    while pending {
        let dispatch = NhcDispatch::from_byte(reader.peek_u8(ParseContext::NhcDispatch)?)?;
        match headers.extension_headers.last_mut() {
            Some(ext) => ext.next_header = dispatch.protocol(),
            None => headers.ipv6.next_header = dispatch.protocol(),
        }

        match dispatch {
            NhcDispatch::Extension(_) => {
                let (ext, more) = decompress_extension(&mut reader)?;
                headers.extension_headers.push(ext);
                pending = more;
            }
            NhcDispatch::Udp => {
                let fields = decompress_udp(&mut reader)?;
                checksum_elided = fields.checksum.is_none();
                headers.udp = Some(UdpHeader {
                    src_port: fields.src_port,
                    dst_port: fields.dst_port,
                    length: 0,
                    checksum: fields.checksum.unwrap_or(0),
                });
                pending = false;
            }
        }
    }

    let consumed = reader.consumed();
    let payload = reader.rest();
    let payload_length = headers.uncompressed_len() - IPV6_HEADER_LENGTH_BYTES + payload.len();
    if payload_length > u16::MAX as usize {
        return Err(LowpanParsingError::InvalidFieldValue {
            field: Field::PayloadLength,
            expected: u16::MAX as u32,
            got: payload_length as u32,
        }
        .into());
    }
    headers.set_lengths(payload.len());

    if checksum_elided {
        let (src, dst) = (headers.ipv6.src, headers.ipv6.dst);
        if let Some(udp) = headers.udp.as_mut() {
            udp.checksum = udp_checksum(&src, &dst, udp, payload);
        }
    }

    trace!(
        "Decompressed {} header bytes into {}",
        consumed,
        headers.uncompressed_len()
    );
    Ok(DecompressedHeaders { headers, consumed })
}
