//! LOWPAN_IPHC bit layout (RFC 6282, Sec 3.1).
//!
//! The two IPHC bytes are handled as one big-endian `u16` control word:
//!
//! ```text
//!   0                                       1
//!   0   1   2   3   4   5   6   7   8   9   0   1   2   3   4   5
//! +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//! | 0 | 1 | 1 |  TF   |NH | HLIM  |CID|SAC|  SAM  | M |DAC|  DAM  |
//! +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//! ```

/// Mask selecting the three dispatch bits.
pub const IPHC_DISPATCH_MASK: u16 = 0xe000;
/// `011` dispatch value.
pub const IPHC_DISPATCH: u16 = 0x6000;

pub const IPHC_TF_MASK: u16 = 0x1800;
pub const IPHC_TF_SHIFT: u16 = 11;
pub const IPHC_NH_BIT: u16 = 0x0400;
pub const IPHC_HLIM_MASK: u16 = 0x0300;
pub const IPHC_HLIM_SHIFT: u16 = 8;
pub const IPHC_CID_BIT: u16 = 0x0080;
pub const IPHC_SAC_BIT: u16 = 0x0040;
pub const IPHC_SAM_MASK: u16 = 0x0030;
pub const IPHC_SAM_SHIFT: u16 = 4;
pub const IPHC_M_BIT: u16 = 0x0008;
pub const IPHC_DAC_BIT: u16 = 0x0004;
pub const IPHC_DAM_MASK: u16 = 0x0003;

/// Source context id nibble of the context extension byte.
pub const IPHC_SCI_SHIFT: u8 = 4;
/// Destination context id nibble of the context extension byte.
pub const IPHC_DCI_MASK: u8 = 0x0f;

// Hop limits substituted for the compressed HLIM values.
pub const HOP_LIMIT_ONE: u8 = 1;
pub const HOP_LIMIT_SIXTY_FOUR: u8 = 64;
pub const HOP_LIMIT_MAX: u8 = 255;

/// Position of ECN within the first inline traffic class/flow label byte.
pub const TF_ECN_SHIFT: u8 = 6;
/// DSCP bits within the first inline traffic class/flow label byte.
pub const TF_DSCP_MASK: u8 = 0x3f;
/// Flow label nibble within the first flow label byte.
pub const TF_FLOW_LABEL_HIGH_MASK: u8 = 0x0f;
