//! IEEE 802.15.4 link-layer addresses as seen by the codec.
//!
//! The MAC layer resolves both ends of every frame and hands them over per
//! call. The codec only needs them to derive interface identifiers for fully
//! elided addresses (RFC 4944, Sec 6 and RFC 6282, Sec 3.2.2).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{EUI64_UL_BIT, IID_LENGTH_BYTES, SHORT_ADDRESS_IID_PREFIX};

/// Link-layer address of one end of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MacAddress {
    /// Address absent from the frame.
    #[default]
    None,
    /// 16-bit short address.
    Short(u16),
    /// 64-bit extended address (EUI-64), most significant byte first.
    Extended([u8; 8]),
}

impl MacAddress {
    /// Derives the interface identifier a fully elided address stands for.
    ///
    /// Returns `None` for [`MacAddress::None`], which has nothing to derive from.
    pub fn to_iid(&self) -> Option<[u8; IID_LENGTH_BYTES]> {
        match *self {
            MacAddress::None => None,
            MacAddress::Short(short) => Some(short_address_iid(short)),
            MacAddress::Extended(ext) => {
                let mut iid = ext;
                iid[0] ^= EUI64_UL_BIT;
                Some(iid)
            }
        }
    }

    /// True when the frame carries no address for this end.
    pub fn is_none(&self) -> bool {
        matches!(self, MacAddress::None)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacAddress::None => f.write_str("none"),
            MacAddress::Short(short) => write!(f, "0x{:04x}", short),
            MacAddress::Extended(ext) => {
                for (i, byte) in ext.iter().enumerate() {
                    if i > 0 {
                        f.write_str(":")?;
                    }
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// IID `0000:00ff:fe00:XXXX` formed from a 16-bit short address.
pub fn short_address_iid(short: u16) -> [u8; IID_LENGTH_BYTES] {
    let mut iid = [0u8; IID_LENGTH_BYTES];
    iid[..6].copy_from_slice(&SHORT_ADDRESS_IID_PREFIX);
    iid[6..].copy_from_slice(&short.to_be_bytes());
    iid
}

/// The source and destination link-layer addresses of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkAddresses {
    /// Address of the transmitting node.
    pub source: MacAddress,
    /// Address of the receiving node.
    pub destination: MacAddress,
}

impl LinkAddresses {
    /// Creates the addressing of a frame from `source` to `destination`.
    pub fn new(source: MacAddress, destination: MacAddress) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Addressing of a frame this node is about to send to `peer`.
    pub fn outbound(local: MacAddress, peer: MacAddress) -> Self {
        Self::new(local, peer)
    }

    /// Addressing of a frame this node received from `peer`.
    pub fn inbound(local: MacAddress, peer: MacAddress) -> Self {
        Self::new(peer, local)
    }
}
