//! IPv6 address compression modes (RFC 6282, Sec 3.1.1 and 3.2.2).
//!
//! Selection is kept pure: given an address, the interface identifier the
//! link layer would imply and an optional context, [`select_unicast_encoding`]
//! and [`select_multicast_encoding`] return the shortest mode from which the
//! decompressor rebuilds the exact same 128 bits.

use std::net::Ipv6Addr;

use crate::constants::{
    IID_LENGTH_BYTES, IPV6_ADDRESS_LENGTH_BYTES, LINK_LOCAL_PREFIX, MULTICAST_LINK_LOCAL_SCOPE,
    MULTICAST_PREFIX_BYTE,
};
use crate::context_manager::ContextEntry;
use crate::cursor::FieldReader;
use crate::error::{Field, LowpanParsingError, ParseContext};
use crate::mac::{MacAddress, short_address_iid};
use crate::traits::ContextLookup;
use crate::types::ContextId;

/// Unicast address modes, shared by SAM and DAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressEncoding {
    /// Mode 0: all 128 bits inline.
    Full,
    /// Mode 1: interface identifier inline.
    Elided64,
    /// Mode 2: low 16 bits inline, IID is `0000:00ff:fe00:XXXX`.
    Short16,
    /// Mode 3: IID derived from the link-layer address.
    Elided,
}

impl AddressEncoding {
    pub fn mode(self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Elided64 => 1,
            Self::Short16 => 2,
            Self::Elided => 3,
        }
    }

    pub fn from_mode(mode: u8) -> Self {
        match mode & 0x03 {
            0 => Self::Full,
            1 => Self::Elided64,
            2 => Self::Short16,
            _ => Self::Elided,
        }
    }

    pub fn inline_len(self) -> usize {
        match self {
            Self::Full => 16,
            Self::Elided64 => 8,
            Self::Short16 => 2,
            Self::Elided => 0,
        }
    }
}

/// Stateless multicast destination modes (M=1, DAC=0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulticastEncoding {
    /// DAM=00: all 128 bits inline.
    Full,
    /// DAM=01: `ffXX::00XX:XXXX:XXXX`, 6 bytes inline.
    Inline48,
    /// DAM=10: `ffXX::00XX:XXXX`, 4 bytes inline.
    Inline32,
    /// DAM=11: `ff02::00XX`, 1 byte inline.
    Inline8,
}

impl MulticastEncoding {
    pub fn mode(self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Inline48 => 1,
            Self::Inline32 => 2,
            Self::Inline8 => 3,
        }
    }

    pub fn from_mode(mode: u8) -> Self {
        match mode & 0x03 {
            0 => Self::Full,
            1 => Self::Inline48,
            2 => Self::Inline32,
            _ => Self::Inline8,
        }
    }

    pub fn inline_len(self) -> usize {
        match self {
            Self::Full => 16,
            Self::Inline48 => 6,
            Self::Inline32 => 4,
            Self::Inline8 => 1,
        }
    }
}

/// Bytes carried by the RFC 3306 context-based multicast form (M=1, DAC=1, DAM=00).
const STATEFUL_MULTICAST_INLINE_LEN: usize = 6;

/// True when `address` equals the upper bits it already has, `iid` below
/// them, and the prefix bits of `context` overlaid on the result.
fn rebuilds_from_iid(
    address: &Ipv6Addr,
    iid: [u8; IID_LENGTH_BYTES],
    context: Option<&ContextEntry>,
) -> bool {
    let original = address.octets();
    let mut candidate = original;
    candidate[IID_LENGTH_BYTES..].copy_from_slice(&iid);
    if let Some(context) = context {
        context.apply_prefix(&mut candidate);
    }
    candidate == original
}

/// Chooses the shortest unicast mode for `address`.
///
/// With `context` set the upper 64 bits must be exactly what the context
/// rebuilds; without it they must be the link-local prefix `fe80::/64`.
/// Anything else needs [`AddressEncoding::Full`].
pub fn select_unicast_encoding(
    address: &Ipv6Addr,
    derived_iid: Option<[u8; IID_LENGTH_BYTES]>,
    context: Option<&ContextEntry>,
) -> AddressEncoding {
    let octets = address.octets();
    let upper = &octets[..IID_LENGTH_BYTES];
    let upper_rebuilt = match context {
        Some(context) => context.matches(address) && upper == context.network_prefix(),
        None => upper == LINK_LOCAL_PREFIX,
    };
    if !upper_rebuilt {
        return AddressEncoding::Full;
    }

    if derived_iid.is_some_and(|iid| rebuilds_from_iid(address, iid, context)) {
        return AddressEncoding::Elided;
    }
    let short = u16::from_be_bytes([octets[14], octets[15]]);
    if rebuilds_from_iid(address, short_address_iid(short), context) {
        AddressEncoding::Short16
    } else {
        AddressEncoding::Elided64
    }
}

/// Chooses the shortest stateless multicast mode for `address`.
pub fn select_multicast_encoding(address: &Ipv6Addr) -> MulticastEncoding {
    let octets = address.octets();
    let zero_through = |end: usize| octets[2..end].iter().all(|&b| b == 0);

    if octets[1] == MULTICAST_LINK_LOCAL_SCOPE && zero_through(15) {
        MulticastEncoding::Inline8
    } else if zero_through(13) {
        MulticastEncoding::Inline32
    } else if zero_through(11) {
        MulticastEncoding::Inline48
    } else {
        MulticastEncoding::Full
    }
}

/// One address after compression: the SAC/DAC flag, the mode bits and the
/// bytes to carry inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedAddress {
    pub stateful: bool,
    pub mode: u8,
    /// Context the encoding depends on, if any.
    pub context_id: Option<ContextId>,
    inline: [u8; IPV6_ADDRESS_LENGTH_BYTES],
    inline_len: usize,
}

impl EncodedAddress {
    fn new(stateful: bool, mode: u8, context_id: Option<ContextId>, bytes: &[u8]) -> Self {
        let mut inline = [0u8; IPV6_ADDRESS_LENGTH_BYTES];
        inline[..bytes.len()].copy_from_slice(bytes);
        Self {
            stateful,
            mode,
            context_id,
            inline,
            inline_len: bytes.len(),
        }
    }

    /// Bytes that follow the IPHC header for this address.
    pub fn inline(&self) -> &[u8] {
        &self.inline[..self.inline_len]
    }
}

fn unicast_tail(octets: &[u8; IPV6_ADDRESS_LENGTH_BYTES], encoding: AddressEncoding) -> &[u8] {
    &octets[IPV6_ADDRESS_LENGTH_BYTES - encoding.inline_len()..]
}

/// Compresses a source address. `::` takes the SAC=1, SAM=00 form.
pub fn compress_source(
    address: &Ipv6Addr,
    mac: MacAddress,
    contexts: &dyn ContextLookup,
) -> EncodedAddress {
    if address.is_unspecified() {
        return EncodedAddress::new(true, 0, None, &[]);
    }
    compress_unicast(address, mac, contexts)
}

/// Compresses a unicast address, stateless when link-local and through the
/// best matching context otherwise.
pub fn compress_unicast(
    address: &Ipv6Addr,
    mac: MacAddress,
    contexts: &dyn ContextLookup,
) -> EncodedAddress {
    let octets = address.octets();
    let derived_iid = mac.to_iid();

    if octets[..IID_LENGTH_BYTES] != LINK_LOCAL_PREFIX {
        if let Some(context) = contexts.find_by_prefix_for_compression(address) {
            let encoding = select_unicast_encoding(address, derived_iid, Some(&context));
            if encoding != AddressEncoding::Full {
                return EncodedAddress::new(
                    true,
                    encoding.mode(),
                    Some(context.context_id),
                    unicast_tail(&octets, encoding),
                );
            }
        }
    }

    let encoding = select_unicast_encoding(address, derived_iid, None);
    EncodedAddress::new(false, encoding.mode(), None, unicast_tail(&octets, encoding))
}

/// Compresses a multicast destination.
///
/// Falls back to the context-based RFC 3306 form only when no stateless
/// form shorter than the full address applies.
pub fn compress_multicast(address: &Ipv6Addr, contexts: &dyn ContextLookup) -> EncodedAddress {
    let octets = address.octets();
    let encoding = select_multicast_encoding(address);
    let stateless = |inline: &[u8]| EncodedAddress::new(false, encoding.mode(), None, inline);
    match encoding {
        MulticastEncoding::Inline8 => return stateless(&octets[15..]),
        MulticastEncoding::Inline32 => {
            return stateless(&[octets[1], octets[13], octets[14], octets[15]]);
        }
        MulticastEncoding::Inline48 => {
            return stateless(&[
                octets[1], octets[11], octets[12], octets[13], octets[14], octets[15],
            ]);
        }
        MulticastEncoding::Full => {}
    }

    let mut network_prefix = [0u8; 8];
    network_prefix.copy_from_slice(&octets[4..12]);
    if let Some(context) = contexts.find_multicast_prefix(octets[3], &network_prefix) {
        return EncodedAddress::new(
            true,
            0,
            Some(context.context_id),
            &[octets[1], octets[2], octets[12], octets[13], octets[14], octets[15]],
        );
    }
    stateless(&octets)
}

/// Where the upper 64 bits of a decompressed unicast address come from.
#[derive(Debug, Clone, Copy)]
pub enum UnicastBase<'a> {
    /// `fe80::/64`.
    LinkLocal,
    /// The prefix of a context, also overlaid on the IID past 64 bits.
    Context(&'a ContextEntry),
}

/// Rebuilds a unicast address from its inline bytes.
///
/// # Errors
/// - [`LowpanParsingError::NotEnoughData`] - Inline bytes truncated
/// - [`LowpanParsingError::MissingLinkAddress`] - Mode 3 with no link-layer address
pub fn decompress_unicast(
    reader: &mut FieldReader<'_>,
    base: UnicastBase<'_>,
    encoding: AddressEncoding,
    mac: MacAddress,
    field: Field,
    context: ParseContext,
) -> Result<Ipv6Addr, LowpanParsingError> {
    let iid = match encoding {
        AddressEncoding::Full => {
            return Ok(Ipv6Addr::from(
                reader.read_array::<IPV6_ADDRESS_LENGTH_BYTES>(context)?,
            ));
        }
        AddressEncoding::Elided64 => reader.read_array::<IID_LENGTH_BYTES>(context)?,
        AddressEncoding::Short16 => short_address_iid(reader.read_u16(context)?),
        AddressEncoding::Elided => mac
            .to_iid()
            .ok_or(LowpanParsingError::MissingLinkAddress { field })?,
    };

    let mut bytes = [0u8; IPV6_ADDRESS_LENGTH_BYTES];
    bytes[IID_LENGTH_BYTES..].copy_from_slice(&iid);
    match base {
        UnicastBase::LinkLocal => bytes[..IID_LENGTH_BYTES].copy_from_slice(&LINK_LOCAL_PREFIX),
        UnicastBase::Context(entry) => entry.apply_prefix(&mut bytes),
    }
    Ok(Ipv6Addr::from(bytes))
}

/// Rebuilds a stateless multicast destination.
pub fn decompress_multicast(
    reader: &mut FieldReader<'_>,
    encoding: MulticastEncoding,
) -> Result<Ipv6Addr, LowpanParsingError> {
    let context = ParseContext::DestinationAddress;
    let mut bytes = [0u8; IPV6_ADDRESS_LENGTH_BYTES];
    bytes[0] = MULTICAST_PREFIX_BYTE;
    match encoding {
        MulticastEncoding::Full => {
            bytes = reader.read_array::<IPV6_ADDRESS_LENGTH_BYTES>(context)?;
        }
        MulticastEncoding::Inline48 => {
            let inline = reader.read_array::<6>(context)?;
            bytes[1] = inline[0];
            bytes[11..].copy_from_slice(&inline[1..]);
        }
        MulticastEncoding::Inline32 => {
            let inline = reader.read_array::<4>(context)?;
            bytes[1] = inline[0];
            bytes[13..].copy_from_slice(&inline[1..]);
        }
        MulticastEncoding::Inline8 => {
            bytes[1] = MULTICAST_LINK_LOCAL_SCOPE;
            bytes[15] = reader.read_u8(context)?;
        }
    }
    Ok(Ipv6Addr::from(bytes))
}

/// Rebuilds an RFC 3306 unicast-prefix-based multicast destination whose
/// prefix length and network prefix come from `entry`.
pub fn decompress_stateful_multicast(
    reader: &mut FieldReader<'_>,
    entry: &ContextEntry,
) -> Result<Ipv6Addr, LowpanParsingError> {
    let inline =
        reader.read_array::<STATEFUL_MULTICAST_INLINE_LEN>(ParseContext::DestinationAddress)?;
    let mut bytes = [0u8; IPV6_ADDRESS_LENGTH_BYTES];
    bytes[0] = MULTICAST_PREFIX_BYTE;
    bytes[1] = inline[0];
    bytes[2] = inline[1];
    bytes[3] = entry.prefix_length;
    bytes[4..12].copy_from_slice(&entry.network_prefix());
    bytes[12..].copy_from_slice(&inline[2..]);
    Ok(Ipv6Addr::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_manager::ContextTable;

    const EXT_MAC: MacAddress =
        MacAddress::Extended([0x14, 0x6e, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x01]);

    fn addr(text: &str) -> Ipv6Addr {
        text.parse().unwrap()
    }

    fn mesh_local_table() -> ContextTable {
        ContextTable::with_mesh_local_prefix(addr("fd00:db8::"))
    }

    #[test]
    fn link_local_from_extended_mac_is_elided() {
        let address = addr("fe80::166e:a00:0:1");
        assert_eq!(
            select_unicast_encoding(&address, EXT_MAC.to_iid(), None),
            AddressEncoding::Elided
        );
    }

    #[test]
    fn link_local_short_form_needs_two_bytes_without_mac_match() {
        let address = addr("fe80::ff:fe00:1234");
        assert_eq!(
            select_unicast_encoding(&address, EXT_MAC.to_iid(), None),
            AddressEncoding::Short16
        );
        assert_eq!(
            select_unicast_encoding(&address, MacAddress::Short(0x1234).to_iid(), None),
            AddressEncoding::Elided
        );
    }

    #[test]
    fn global_without_context_is_full() {
        let address = addr("2001:db8::1");
        assert_eq!(select_unicast_encoding(&address, None, None), AddressEncoding::Full);
    }

    #[test]
    fn context_shorter_than_64_must_rebuild_zero_gap() {
        let entry = ContextEntry::new(ContextId::new(1), addr("2001:db8::"), 32);
        assert_eq!(
            select_unicast_encoding(&addr("2001:db8::5"), None, Some(&entry)),
            AddressEncoding::Elided64
        );
        // Bits 32..64 are not zero, the context cannot rebuild them.
        assert_eq!(
            select_unicast_encoding(&addr("2001:db8:1:2::5"), None, Some(&entry)),
            AddressEncoding::Full
        );
    }

    #[test]
    fn context_longer_than_64_overlays_iid() {
        let entry = ContextEntry::new(ContextId::new(2), addr("fd00:db8::ff:fe00:0"), 112);
        let address = addr("fd00:db8::ff:fe00:abcd");
        assert_eq!(
            select_unicast_encoding(&address, None, Some(&entry)),
            AddressEncoding::Short16
        );
        assert_eq!(
            select_unicast_encoding(&address, MacAddress::Short(0xabcd).to_iid(), Some(&entry)),
            AddressEncoding::Elided
        );
    }

    #[test]
    fn multicast_selection_boundaries() {
        assert_eq!(select_multicast_encoding(&addr("ff02::1")), MulticastEncoding::Inline8);
        assert_eq!(select_multicast_encoding(&addr("ff05::1")), MulticastEncoding::Inline32);
        assert_eq!(select_multicast_encoding(&addr("ff02::1:ff00:1")), MulticastEncoding::Inline48);
        assert_eq!(select_multicast_encoding(&addr("ff05::1:2:3")), MulticastEncoding::Inline48);
        assert_eq!(
            select_multicast_encoding(&addr("ff05:0:0:0:1::1")),
            MulticastEncoding::Full
        );
    }

    #[test]
    fn forty_eight_bit_form_requires_zero_byte_ten() {
        // Byte 10 is non-zero: only the full form rebuilds it.
        let address = addr("ff05::100:0:1");
        assert_eq!(address.octets()[10], 0x01);
        assert_eq!(select_multicast_encoding(&address), MulticastEncoding::Full);
    }

    #[test]
    fn compress_source_unspecified() {
        let table = mesh_local_table();
        let encoded = compress_source(&Ipv6Addr::UNSPECIFIED, EXT_MAC, &table);
        assert!(encoded.stateful);
        assert_eq!(encoded.mode, 0);
        assert!(encoded.inline().is_empty());
        assert_eq!(encoded.context_id, None);
    }

    #[test]
    fn compress_unicast_uses_mesh_local_context() {
        let table = mesh_local_table();
        let encoded = compress_unicast(&addr("fd00:db8::ff:fe00:fc00"), EXT_MAC, &table);
        assert!(encoded.stateful);
        assert_eq!(encoded.mode, 2);
        assert_eq!(encoded.context_id, Some(ContextId::MESH_LOCAL));
        assert_eq!(encoded.inline(), &[0xfc, 0x00]);
    }

    #[test]
    fn compress_multicast_uses_stateful_form_when_context_matches() {
        let mut table = ContextTable::new();
        table
            .insert(ContextEntry::new(ContextId::new(3), addr("fd00:db8::"), 64))
            .unwrap();
        let group = addr("ff33:40:fd00:db8:0:0:0:1");
        let encoded = compress_multicast(&group, &table);
        assert!(encoded.stateful);
        assert_eq!(encoded.mode, 0);
        assert_eq!(encoded.context_id, Some(ContextId::new(3)));
        assert_eq!(encoded.inline(), &[0x33, 0x00, 0, 0, 0, 1]);

        let mut reader = FieldReader::new(encoded.inline());
        let entry = table.find_by_id(encoded.context_id.unwrap()).unwrap();
        assert_eq!(decompress_stateful_multicast(&mut reader, &entry).unwrap(), group);
    }

    #[test]
    fn decompress_multicast_forms() {
        let mut reader = FieldReader::new(&[0x01]);
        assert_eq!(
            decompress_multicast(&mut reader, MulticastEncoding::Inline8).unwrap(),
            addr("ff02::1")
        );

        let inline = [0x05, 0x01, 0x02, 0x03, 0x04, 0x05];
        let mut reader = FieldReader::new(&inline);
        assert_eq!(
            decompress_multicast(&mut reader, MulticastEncoding::Inline48).unwrap(),
            addr("ff05::1:203:405")
        );
    }

    #[test]
    fn elided_without_link_address_fails() {
        let mut reader = FieldReader::new(&[]);
        let err = decompress_unicast(
            &mut reader,
            UnicastBase::LinkLocal,
            AddressEncoding::Elided,
            MacAddress::None,
            Field::SourceAddress,
            ParseContext::SourceAddress,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LowpanParsingError::MissingLinkAddress {
                field: Field::SourceAddress
            }
        );
    }

    #[test]
    fn decompress_unicast_with_long_context_overlays_prefix() {
        let entry = ContextEntry::new(ContextId::new(2), addr("fd00:db8::ff:fe00:0"), 112);
        let mut reader = FieldReader::new(&[0xab, 0xcd]);
        let address = decompress_unicast(
            &mut reader,
            UnicastBase::Context(&entry),
            AddressEncoding::Short16,
            MacAddress::None,
            Field::DestinationAddress,
            ParseContext::DestinationAddress,
        )
        .unwrap();
        assert_eq!(address, addr("fd00:db8::ff:fe00:abcd"));
    }
}
