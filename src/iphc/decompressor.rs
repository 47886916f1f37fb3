//! LOWPAN_IPHC decoder.

use std::net::Ipv6Addr;

use log::trace;

use crate::context_manager::ContextEntry;
use crate::cursor::FieldReader;
use crate::error::{Field, LowpanError, LowpanParsingError, ParseContext};
use crate::iphc::address::{
    AddressEncoding, MulticastEncoding, UnicastBase, decompress_multicast,
    decompress_stateful_multicast, decompress_unicast,
};
use crate::iphc::constants::{
    IPHC_DCI_MASK, IPHC_SCI_SHIFT, TF_DSCP_MASK, TF_ECN_SHIFT, TF_FLOW_LABEL_HIGH_MASK,
};
use crate::iphc::header::{IphcControl, TrafficFlowEncoding};
use crate::mac::LinkAddresses;
use crate::protocol_types::Ipv6Header;
use crate::traits::ContextLookup;
use crate::types::{ContextId, FlowLabel};

/// An IPv6 header rebuilt from its IPHC form.
///
/// `next_header` is meaningful only when `next_header_compressed` is false;
/// otherwise the first NHC dispatch byte that follows determines it.
/// `payload_length` is left at zero for the caller to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IphcDecoded {
    pub ipv6: Ipv6Header,
    pub next_header_compressed: bool,
}

fn lookup(contexts: &dyn ContextLookup, id: u8) -> Result<ContextEntry, LowpanError> {
    let context_id = ContextId::new(id);
    contexts
        .find_by_id(context_id)
        .ok_or(LowpanError::ContextNotFound(context_id))
}

/// Reads an IPHC header and its inline fields from `reader`.
///
/// Contexts are looked up only for the addresses that need one.
///
/// # Errors
/// - [`LowpanError::Parsing`] - Bad dispatch, truncated input or a reserved mode
/// - [`LowpanError::ContextNotFound`] - A referenced context is absent or invalid
pub fn decompress_iphc(
    reader: &mut FieldReader<'_>,
    links: &LinkAddresses,
    contexts: &dyn ContextLookup,
) -> Result<IphcDecoded, LowpanError> {
    let control = IphcControl::from_bytes(reader.read_array::<2>(ParseContext::IphcBase)?)?;

    let (source_cid, destination_cid) = if control.context_extension() {
        let byte = reader.read_u8(ParseContext::ContextExtension)?;
        (byte >> IPHC_SCI_SHIFT, byte & IPHC_DCI_MASK)
    } else {
        (0, 0)
    };

    let (traffic_class, flow_label) = read_traffic_flow(control.traffic_flow(), reader)?;

    let next_header_compressed = control.next_header_compressed();
    let next_header = if next_header_compressed {
        0
    } else {
        reader.read_u8(ParseContext::NextHeader)?
    };

    let hop_limit = match control.hop_limit().implied() {
        Some(hop_limit) => hop_limit,
        None => reader.read_u8(ParseContext::HopLimit)?,
    };

    let src = if control.source_stateful() {
        if control.source_mode() == 0 {
            Ipv6Addr::UNSPECIFIED
        } else {
            let entry = lookup(contexts, source_cid)?;
            decompress_unicast(
                reader,
                UnicastBase::Context(&entry),
                AddressEncoding::from_mode(control.source_mode()),
                links.source,
                Field::SourceAddress,
                ParseContext::SourceAddress,
            )?
        }
    } else {
        decompress_unicast(
            reader,
            UnicastBase::LinkLocal,
            AddressEncoding::from_mode(control.source_mode()),
            links.source,
            Field::SourceAddress,
            ParseContext::SourceAddress,
        )?
    };

    let destination_mode = control.destination_mode();
    let dst = match (control.multicast(), control.destination_stateful()) {
        (true, true) => {
            if destination_mode != 0 {
                return Err(reserved_destination(destination_mode));
            }
            let entry = lookup(contexts, destination_cid)?;
            decompress_stateful_multicast(reader, &entry)?
        }
        (true, false) => {
            decompress_multicast(reader, MulticastEncoding::from_mode(destination_mode))?
        }
        (false, true) => {
            if destination_mode == 0 {
                return Err(reserved_destination(destination_mode));
            }
            let entry = lookup(contexts, destination_cid)?;
            decompress_unicast(
                reader,
                UnicastBase::Context(&entry),
                AddressEncoding::from_mode(destination_mode),
                links.destination,
                Field::DestinationAddress,
                ParseContext::DestinationAddress,
            )?
        }
        (false, false) => decompress_unicast(
            reader,
            UnicastBase::LinkLocal,
            AddressEncoding::from_mode(destination_mode),
            links.destination,
            Field::DestinationAddress,
            ParseContext::DestinationAddress,
        )?,
    };

    trace!(
        "IPHC {:02x?} decoded {} -> {} after {} bytes",
        control.to_bytes(),
        src,
        dst,
        reader.consumed()
    );

    Ok(IphcDecoded {
        ipv6: Ipv6Header {
            traffic_class,
            flow_label,
            payload_length: 0,
            next_header,
            hop_limit,
            src,
            dst,
        },
        next_header_compressed,
    })
}

fn reserved_destination(mode: u8) -> LowpanError {
    LowpanParsingError::ReservedEncoding {
        field: Field::DestinationAddress,
        value: mode,
    }
    .into()
}

/// Returns the traffic class and flow label carried by `encoding`.
fn read_traffic_flow(
    encoding: TrafficFlowEncoding,
    reader: &mut FieldReader<'_>,
) -> Result<(u8, FlowLabel), LowpanParsingError> {
    let context = ParseContext::TrafficFlow;
    let label = |high: u8, mid: u8, low: u8| {
        FlowLabel::new(u32::from_be_bytes([0, high & TF_FLOW_LABEL_HIGH_MASK, mid, low]))
    };
    let traffic_class = |first: u8, with_dscp: bool| {
        let ecn = first >> TF_ECN_SHIFT;
        let dscp = if with_dscp { first & TF_DSCP_MASK } else { 0 };
        (dscp << 2) | ecn
    };

    Ok(match encoding {
        TrafficFlowEncoding::Inline => {
            let [first, high, mid, low] = reader.read_array::<4>(context)?;
            (traffic_class(first, true), label(high, mid, low))
        }
        TrafficFlowEncoding::EcnFlowLabel => {
            let [first, mid, low] = reader.read_array::<3>(context)?;
            (traffic_class(first, false), label(first, mid, low))
        }
        TrafficFlowEncoding::EcnDscp => {
            let first = reader.read_u8(context)?;
            (traffic_class(first, true), FlowLabel::new(0))
        }
        TrafficFlowEncoding::Elided => (0, FlowLabel::new(0)),
    })
}
