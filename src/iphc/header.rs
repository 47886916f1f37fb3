//! Typed view of the two LOWPAN_IPHC control bytes.
//!
//! [`IphcControl`] wraps the 16-bit control word and exposes each field as
//! a small enum or flag, so the compressor and decompressor never touch raw
//! masks directly.

use crate::error::LowpanParsingError;
use crate::iphc::constants::*;
use crate::protocol_types::Ipv6Header;

/// How traffic class and flow label travel (the TF field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficFlowEncoding {
    /// TF=00: ECN, DSCP and flow label inline (4 bytes).
    Inline,
    /// TF=01: ECN and flow label inline, DSCP elided (3 bytes).
    EcnFlowLabel,
    /// TF=10: ECN and DSCP inline, flow label elided (1 byte).
    EcnDscp,
    /// TF=11: everything elided.
    Elided,
}

impl TrafficFlowEncoding {
    /// Picks the shortest form able to carry `header`'s traffic class and flow label.
    pub fn select(header: &Ipv6Header) -> Self {
        let flow_label = header.flow_label.masked();
        if header.traffic_class == 0 && flow_label == 0 {
            Self::Elided
        } else if flow_label == 0 {
            Self::EcnDscp
        } else if header.dscp() == 0 {
            Self::EcnFlowLabel
        } else {
            Self::Inline
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b00 => Self::Inline,
            0b01 => Self::EcnFlowLabel,
            0b10 => Self::EcnDscp,
            _ => Self::Elided,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Inline => 0b00,
            Self::EcnFlowLabel => 0b01,
            Self::EcnDscp => 0b10,
            Self::Elided => 0b11,
        }
    }

    /// Inline bytes this form carries.
    pub fn inline_len(self) -> usize {
        match self {
            Self::Inline => 4,
            Self::EcnFlowLabel => 3,
            Self::EcnDscp => 1,
            Self::Elided => 0,
        }
    }
}

/// How the hop limit travels (the HLIM field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopLimitEncoding {
    Inline,
    One,
    SixtyFour,
    Max,
}

impl HopLimitEncoding {
    pub fn select(hop_limit: u8) -> Self {
        match hop_limit {
            HOP_LIMIT_ONE => Self::One,
            HOP_LIMIT_SIXTY_FOUR => Self::SixtyFour,
            HOP_LIMIT_MAX => Self::Max,
            _ => Self::Inline,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b00 => Self::Inline,
            0b01 => Self::One,
            0b10 => Self::SixtyFour,
            _ => Self::Max,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Inline => 0b00,
            Self::One => 0b01,
            Self::SixtyFour => 0b10,
            Self::Max => 0b11,
        }
    }

    /// The hop limit implied by the encoding, `None` when carried inline.
    pub fn implied(self) -> Option<u8> {
        match self {
            Self::Inline => None,
            Self::One => Some(HOP_LIMIT_ONE),
            Self::SixtyFour => Some(HOP_LIMIT_SIXTY_FOUR),
            Self::Max => Some(HOP_LIMIT_MAX),
        }
    }
}

/// The LOWPAN_IPHC control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IphcControl(u16);

impl Default for IphcControl {
    fn default() -> Self {
        Self(IPHC_DISPATCH)
    }
}

impl IphcControl {
    /// Parses the first two bytes of a frame.
    ///
    /// # Errors
    /// - [`LowpanParsingError::NotLowpanFrame`] - The `011` dispatch is missing
    pub fn from_bytes(bytes: [u8; 2]) -> Result<Self, LowpanParsingError> {
        let word = u16::from_be_bytes(bytes);
        if word & IPHC_DISPATCH_MASK != IPHC_DISPATCH {
            return Err(LowpanParsingError::NotLowpanFrame(bytes[0]));
        }
        Ok(Self(word))
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    fn flag(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    fn set_flag(&mut self, bit: u16, on: bool) {
        if on {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    fn set_bits(&mut self, mask: u16, shift: u16, value: u8) {
        self.0 = (self.0 & !mask) | (((value as u16) << shift) & mask);
    }

    pub fn traffic_flow(self) -> TrafficFlowEncoding {
        TrafficFlowEncoding::from_bits(((self.0 & IPHC_TF_MASK) >> IPHC_TF_SHIFT) as u8)
    }

    pub fn set_traffic_flow(&mut self, encoding: TrafficFlowEncoding) {
        self.set_bits(IPHC_TF_MASK, IPHC_TF_SHIFT, encoding.bits());
    }

    /// NH: the next header is NHC-compressed.
    pub fn next_header_compressed(self) -> bool {
        self.flag(IPHC_NH_BIT)
    }

    pub fn set_next_header_compressed(&mut self, on: bool) {
        self.set_flag(IPHC_NH_BIT, on);
    }

    pub fn hop_limit(self) -> HopLimitEncoding {
        HopLimitEncoding::from_bits(((self.0 & IPHC_HLIM_MASK) >> IPHC_HLIM_SHIFT) as u8)
    }

    pub fn set_hop_limit(&mut self, encoding: HopLimitEncoding) {
        self.set_bits(IPHC_HLIM_MASK, IPHC_HLIM_SHIFT, encoding.bits());
    }

    /// CID: a context identifier extension byte follows.
    pub fn context_extension(self) -> bool {
        self.flag(IPHC_CID_BIT)
    }

    pub fn set_context_extension(&mut self, on: bool) {
        self.set_flag(IPHC_CID_BIT, on);
    }

    /// SAC: source address is context-based.
    pub fn source_stateful(self) -> bool {
        self.flag(IPHC_SAC_BIT)
    }

    pub fn set_source_stateful(&mut self, on: bool) {
        self.set_flag(IPHC_SAC_BIT, on);
    }

    pub fn source_mode(self) -> u8 {
        ((self.0 & IPHC_SAM_MASK) >> IPHC_SAM_SHIFT) as u8
    }

    pub fn set_source_mode(&mut self, mode: u8) {
        self.set_bits(IPHC_SAM_MASK, IPHC_SAM_SHIFT, mode);
    }

    /// M: destination is a multicast address.
    pub fn multicast(self) -> bool {
        self.flag(IPHC_M_BIT)
    }

    pub fn set_multicast(&mut self, on: bool) {
        self.set_flag(IPHC_M_BIT, on);
    }

    /// DAC: destination address is context-based.
    pub fn destination_stateful(self) -> bool {
        self.flag(IPHC_DAC_BIT)
    }

    pub fn set_destination_stateful(&mut self, on: bool) {
        self.set_flag(IPHC_DAC_BIT, on);
    }

    pub fn destination_mode(self) -> u8 {
        (self.0 & IPHC_DAM_MASK) as u8
    }

    pub fn set_destination_mode(&mut self, mode: u8) {
        self.set_bits(IPHC_DAM_MASK, 0, mode);
    }
}
