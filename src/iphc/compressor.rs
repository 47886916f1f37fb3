//! LOWPAN_IPHC encoder.

use log::trace;

use crate::cursor::FieldWriter;
use crate::error::{LowpanBuildingError, ParseContext};
use crate::iphc::address::{EncodedAddress, compress_multicast, compress_source, compress_unicast};
use crate::iphc::constants::{
    IPHC_SCI_SHIFT, TF_DSCP_MASK, TF_ECN_SHIFT, TF_FLOW_LABEL_HIGH_MASK,
};
use crate::iphc::header::{HopLimitEncoding, IphcControl, TrafficFlowEncoding};
use crate::mac::LinkAddresses;
use crate::protocol_types::Ipv6Header;
use crate::traits::ContextLookup;
use crate::types::ContextId;

/// Writes the IPHC header for `ipv6` and every inline field it leaves.
///
/// `next_header_compressed` sets NH; when clear the next header byte is
/// carried inline. The context extension byte is emitted only when either
/// address depends on a context other than 0.
///
/// # Errors
/// - [`LowpanBuildingError::BufferTooSmall`] - `writer` ran out of space
pub fn compress_iphc(
    ipv6: &Ipv6Header,
    next_header_compressed: bool,
    links: &LinkAddresses,
    contexts: &dyn ContextLookup,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    let traffic_flow = TrafficFlowEncoding::select(ipv6);
    let hop_limit = HopLimitEncoding::select(ipv6.hop_limit);
    let source = compress_source(&ipv6.src, links.source, contexts);
    let destination = if ipv6.dst.is_multicast() {
        compress_multicast(&ipv6.dst, contexts)
    } else {
        compress_unicast(&ipv6.dst, links.destination, contexts)
    };

    let context_id = |address: &EncodedAddress| address.context_id.unwrap_or(ContextId::MESH_LOCAL);
    let source_cid = context_id(&source);
    let destination_cid = context_id(&destination);
    let context_extension =
        source_cid != ContextId::MESH_LOCAL || destination_cid != ContextId::MESH_LOCAL;

    let mut control = IphcControl::default();
    control.set_traffic_flow(traffic_flow);
    control.set_next_header_compressed(next_header_compressed);
    control.set_hop_limit(hop_limit);
    control.set_context_extension(context_extension);
    control.set_source_stateful(source.stateful);
    control.set_source_mode(source.mode);
    control.set_multicast(ipv6.dst.is_multicast());
    control.set_destination_stateful(destination.stateful);
    control.set_destination_mode(destination.mode);

    trace!(
        "IPHC {:02x?} tf={:?} hlim={:?} sam={}/{} dam={}/{}",
        control.to_bytes(),
        traffic_flow,
        hop_limit,
        source.stateful,
        source.mode,
        destination.stateful,
        destination.mode
    );

    writer.put_slice(&control.to_bytes(), ParseContext::IphcBase)?;
    if context_extension {
        writer.put_u8(
            (source_cid.value() << IPHC_SCI_SHIFT) | destination_cid.value(),
            ParseContext::ContextExtension,
        )?;
    }

    write_traffic_flow(ipv6, traffic_flow, writer)?;
    if !next_header_compressed {
        writer.put_u8(ipv6.next_header, ParseContext::NextHeader)?;
    }
    if hop_limit == HopLimitEncoding::Inline {
        writer.put_u8(ipv6.hop_limit, ParseContext::HopLimit)?;
    }
    writer.put_slice(source.inline(), ParseContext::SourceAddress)?;
    writer.put_slice(destination.inline(), ParseContext::DestinationAddress)?;
    Ok(())
}

/// ECN leads the inline bytes, then DSCP, then the flow label.
fn write_traffic_flow(
    ipv6: &Ipv6Header,
    encoding: TrafficFlowEncoding,
    writer: &mut FieldWriter<'_>,
) -> Result<(), LowpanBuildingError> {
    let ecn = ipv6.ecn() << TF_ECN_SHIFT;
    let dscp = ipv6.dscp() & TF_DSCP_MASK;
    let [_, label_high, label_mid, label_low] = ipv6.flow_label.masked().to_be_bytes();
    let label_high = label_high & TF_FLOW_LABEL_HIGH_MASK;
    let context = ParseContext::TrafficFlow;

    match encoding {
        TrafficFlowEncoding::Inline => {
            writer.put_slice(&[ecn | dscp, label_high, label_mid, label_low], context)
        }
        TrafficFlowEncoding::EcnFlowLabel => {
            writer.put_slice(&[ecn | label_high, label_mid, label_low], context)
        }
        TrafficFlowEncoding::EcnDscp => writer.put_u8(ecn | dscp, context),
        TrafficFlowEncoding::Elided => Ok(()),
    }
}
