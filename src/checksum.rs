//! RFC 1071 Internet checksum for UDP over IPv6.
//!
//! Needed when a compressed UDP header elides its checksum: the receiver
//! recomputes it over the IPv6 pseudo-header (RFC 8200, Sec 8.1) so upper
//! layers always see a valid checksum field.

use std::net::Ipv6Addr;

use crate::constants::IP_PROTOCOL_UDP;
use crate::protocol_types::UdpHeader;

fn propagate_carries(word: u32) -> u16 {
    let sum = (word >> 16) + (word & 0xffff);
    ((sum >> 16) as u16) + (sum as u16)
}

/// Computes an RFC 1071 sum of `data` (without the final complement).
pub fn data(data: &[u8]) -> u16 {
    let mut accum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        accum += u16::from_be_bytes([pair[0], pair[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        accum += (*last as u32) << 8;
    }
    propagate_carries(accum)
}

/// Combines several RFC 1071 sums.
pub fn combine(checksums: &[u16]) -> u16 {
    let accum: u32 = checksums.iter().map(|&word| word as u32).sum();
    propagate_carries(accum)
}

/// Sum of the IPv6 pseudo-header for an upper-layer packet of `length` bytes.
pub fn pseudo_header(src: &Ipv6Addr, dst: &Ipv6Addr, next_header: u8, length: u32) -> u16 {
    let mut proto_len = [0u8; 8];
    proto_len[..4].copy_from_slice(&length.to_be_bytes());
    proto_len[7] = next_header;

    combine(&[
        data(&src.octets()),
        data(&dst.octets()),
        data(&proto_len),
    ])
}

/// Computes the UDP checksum of `udp` (its checksum field ignored) followed
/// by `payload`, as carried between `src` and `dst`.
///
/// A computed value of zero is transmitted as `0xffff`.
pub fn udp_checksum(src: &Ipv6Addr, dst: &Ipv6Addr, udp: &UdpHeader, payload: &[u8]) -> u16 {
    let mut header = [0u8; 8];
    header[0..2].copy_from_slice(&udp.src_port.to_be_bytes());
    header[2..4].copy_from_slice(&udp.dst_port.to_be_bytes());
    header[4..6].copy_from_slice(&udp.length.to_be_bytes());

    let sum = combine(&[
        pseudo_header(src, dst, IP_PROTOCOL_UDP, udp.length as u32),
        data(&header),
        data(payload),
    ]);
    match !sum {
        0 => 0xffff,
        checksum => checksum,
    }
}
