//! 6LoWPAN compression context storage.
//!
//! This module provides the [`ContextTable`], a fixed-capacity store of the
//! prefix/context-id bindings advertised in network data. The network-data
//! layer adds and removes entries; the codec borrows the table read-only for
//! the duration of one compress or decompress call through the
//! [`ContextLookup`] trait.

use std::net::Ipv6Addr;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::constants::{IPV6_ADDRESS_LENGTH_BYTES, MAX_CONTEXTS};
use crate::error::LowpanError;
use crate::traits::ContextLookup;
use crate::types::ContextId;

/// A single prefix bound to a context id.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Context id carried in the IPHC context extension nibble.
    pub context_id: ContextId,
    /// Prefix bits; only the first `prefix_length` bits are significant.
    #[serde_as(as = "DisplayFromStr")]
    pub prefix: Ipv6Addr,
    /// Number of significant prefix bits (0..=128).
    pub prefix_length: u8,
    /// Whether the context may be selected when compressing.
    #[serde(default = "default_true")]
    pub compress: bool,
    /// Whether the context may be used at all.
    #[serde(default = "default_true")]
    pub valid: bool,
}

fn default_true() -> bool {
    true
}

impl ContextEntry {
    /// Creates a valid, compression-enabled context.
    pub fn new(context_id: ContextId, prefix: Ipv6Addr, prefix_length: u8) -> Self {
        Self {
            context_id,
            prefix,
            prefix_length,
            compress: true,
            valid: true,
        }
    }

    /// Returns the same context restricted to decompression.
    pub fn decompress_only(mut self) -> Self {
        self.compress = false;
        self
    }

    /// True when the first `prefix_length` bits of `address` equal the prefix.
    pub fn matches(&self, address: &Ipv6Addr) -> bool {
        prefix_match_len(&self.prefix.octets(), &address.octets()) >= self.prefix_length as usize
    }

    /// Overwrites the first `prefix_length` bits of `bytes` with the prefix.
    pub fn apply_prefix(&self, bytes: &mut [u8; IPV6_ADDRESS_LENGTH_BYTES]) {
        let prefix = self.prefix.octets();
        let full_bytes = (self.prefix_length / 8) as usize;
        bytes[..full_bytes].copy_from_slice(&prefix[..full_bytes]);

        let remaining_bits = self.prefix_length % 8;
        if remaining_bits != 0 {
            let mask = 0xffu8 << (8 - remaining_bits);
            bytes[full_bytes] = (bytes[full_bytes] & !mask) | (prefix[full_bytes] & mask);
        }
    }

    /// Upper 64 bits as reconstructed from this context alone.
    ///
    /// Bits between the prefix length and 64 are zero.
    pub fn network_prefix(&self) -> [u8; 8] {
        let mut bytes = [0u8; IPV6_ADDRESS_LENGTH_BYTES];
        self.apply_prefix(&mut bytes);
        let mut network = [0u8; 8];
        network.copy_from_slice(&bytes[..8]);
        network
    }
}

/// Number of leading bits two addresses have in common.
fn prefix_match_len(a: &[u8; IPV6_ADDRESS_LENGTH_BYTES], b: &[u8; IPV6_ADDRESS_LENGTH_BYTES]) -> usize {
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = x ^ y;
        if diff != 0 {
            return i * 8 + diff.leading_zeros() as usize;
        }
    }
    IPV6_ADDRESS_LENGTH_BYTES * 8
}

/// Fixed-capacity table of compression contexts, indexed by context id.
///
/// Holds at most one entry per id. Id 0 is the mesh-local prefix and is
/// always valid once stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ContextEntry>", into = "Vec<ContextEntry>")]
pub struct ContextTable {
    entries: [Option<ContextEntry>; MAX_CONTEXTS],
}

impl ContextTable {
    /// Creates a new, empty `ContextTable`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding only the mesh-local prefix as context 0.
    pub fn with_mesh_local_prefix(prefix: Ipv6Addr) -> Self {
        let mut table = Self::new();
        table.entries[0] = Some(ContextEntry::new(ContextId::MESH_LOCAL, prefix, 64));
        table
    }

    /// Stores `entry`, replacing any entry with the same context id.
    ///
    /// # Errors
    /// - [`LowpanError::InvalidContext`] - Id above 15 or prefix longer than 128 bits
    pub fn insert(&mut self, mut entry: ContextEntry) -> Result<Option<ContextEntry>, LowpanError> {
        if !entry.context_id.is_valid() {
            return Err(LowpanError::InvalidContext {
                context_id: entry.context_id,
                description: "context id does not fit 4 bits",
            });
        }
        if entry.prefix_length as usize > IPV6_ADDRESS_LENGTH_BYTES * 8 {
            return Err(LowpanError::InvalidContext {
                context_id: entry.context_id,
                description: "prefix length exceeds 128 bits",
            });
        }
        if entry.context_id == ContextId::MESH_LOCAL {
            entry.valid = true;
        }

        debug!(
            "Storing {} for {}/{} (compress={}, valid={})",
            entry.context_id, entry.prefix, entry.prefix_length, entry.compress, entry.valid
        );
        Ok(self.entries[entry.context_id.value() as usize].replace(entry))
    }

    /// Removes the entry for `context_id`, returning it if present.
    pub fn remove(&mut self, context_id: ContextId) -> Option<ContextEntry> {
        self.entries
            .get_mut(context_id.value() as usize)
            .and_then(Option::take)
    }

    /// Marks the entry for `context_id` valid or invalid.
    ///
    /// Context 0 cannot be invalidated. Returns `false` if no entry exists.
    pub fn set_valid(&mut self, context_id: ContextId, valid: bool) -> bool {
        match self
            .entries
            .get_mut(context_id.value() as usize)
            .and_then(Option::as_mut)
        {
            Some(entry) => {
                entry.valid = valid || entry.context_id == ContextId::MESH_LOCAL;
                true
            }
            None => false,
        }
    }

    /// Returns the entry for `context_id` regardless of its validity.
    pub fn get(&self, context_id: ContextId) -> Option<&ContextEntry> {
        self.entries
            .get(context_id.value() as usize)
            .and_then(Option::as_ref)
    }

    /// Iterates stored entries in context id order.
    pub fn iter(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.iter().flatten()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries = [None; MAX_CONTEXTS];
    }
}

impl ContextLookup for ContextTable {
    fn find_by_prefix_for_compression(&self, address: &Ipv6Addr) -> Option<ContextEntry> {
        let mut best: Option<&ContextEntry> = None;
        for entry in self.iter().filter(|e| e.valid && e.compress) {
            if !entry.matches(address) {
                continue;
            }
            // Strictly longer only: equal lengths keep the lower id seen first.
            if best.is_none_or(|b| entry.prefix_length > b.prefix_length) {
                best = Some(entry);
            }
        }
        best.copied()
    }

    fn find_by_id(&self, context_id: ContextId) -> Option<ContextEntry> {
        self.get(context_id).filter(|e| e.valid).copied()
    }

    fn find_multicast_prefix(&self, prefix_length: u8, prefix: &[u8; 8]) -> Option<ContextEntry> {
        if prefix_length > 64 {
            return None;
        }
        self.iter()
            .filter(|e| e.valid && e.compress && e.prefix_length == prefix_length)
            .find(|e| e.network_prefix() == *prefix)
            .copied()
    }
}

impl TryFrom<Vec<ContextEntry>> for ContextTable {
    type Error = LowpanError;

    fn try_from(entries: Vec<ContextEntry>) -> Result<Self, Self::Error> {
        let mut table = ContextTable::new();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }
}

impl From<ContextTable> for Vec<ContextEntry> {
    fn from(table: ContextTable) -> Self {
        table.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u8, prefix: &str, len: u8) -> ContextEntry {
        ContextEntry::new(ContextId::new(id), prefix.parse().unwrap(), len)
    }

    #[test]
    fn context_table_new_is_empty() {
        let table = ContextTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn insert_and_get_context() {
        let mut table = ContextTable::new();
        assert_eq!(table.insert(entry(3, "2001:db8::", 64)).unwrap(), None);
        assert_eq!(table.len(), 1);
        let stored = table.get(ContextId::new(3)).unwrap();
        assert_eq!(stored.prefix_length, 64);

        let replaced = table.insert(entry(3, "2001:db9::", 48)).unwrap();
        assert_eq!(replaced.unwrap().prefix, "2001:db8::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_rejects_out_of_range_values() {
        let mut table = ContextTable::new();
        let err = table.insert(entry(16, "2001:db8::", 64)).unwrap_err();
        assert!(matches!(err, LowpanError::InvalidContext { .. }));
        let err = table.insert(entry(1, "2001:db8::", 129)).unwrap_err();
        assert!(matches!(err, LowpanError::InvalidContext { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn mesh_local_context_always_valid() {
        let mut table = ContextTable::new();
        let mut mesh_local = entry(0, "fd00:db8::", 64);
        mesh_local.valid = false;
        table.insert(mesh_local).unwrap();
        assert!(table.find_by_id(ContextId::MESH_LOCAL).is_some());

        assert!(table.set_valid(ContextId::MESH_LOCAL, false));
        assert!(table.find_by_id(ContextId::MESH_LOCAL).is_some());
    }

    #[test]
    fn find_by_id_requires_valid_entry() {
        let mut table = ContextTable::new();
        table.insert(entry(5, "2001:db8::", 64)).unwrap();
        assert!(table.find_by_id(ContextId::new(5)).is_some());
        assert!(table.set_valid(ContextId::new(5), false));
        assert!(table.find_by_id(ContextId::new(5)).is_none());
        assert!(table.find_by_id(ContextId::new(7)).is_none());
        assert!(!table.set_valid(ContextId::new(7), true));
    }

    #[test]
    fn longest_prefix_wins_for_compression() {
        let mut table = ContextTable::new();
        table.insert(entry(1, "2001:db8::", 32)).unwrap();
        table.insert(entry(2, "2001:db8:1::", 48)).unwrap();
        table.insert(entry(3, "2001:db8:1:2::", 64)).unwrap();

        let addr: Ipv6Addr = "2001:db8:1:2::5".parse().unwrap();
        assert_eq!(table.find_by_prefix_for_compression(&addr).unwrap().context_id, 3);

        let addr: Ipv6Addr = "2001:db8:1:3::5".parse().unwrap();
        assert_eq!(table.find_by_prefix_for_compression(&addr).unwrap().context_id, 2);

        let addr: Ipv6Addr = "2001:db9::1".parse().unwrap();
        assert!(table.find_by_prefix_for_compression(&addr).is_none());
    }

    #[test]
    fn equal_length_tie_goes_to_lowest_id() {
        let mut table = ContextTable::new();
        table.insert(entry(9, "2001:db8::", 64)).unwrap();
        table.insert(entry(4, "2001:db8::", 64)).unwrap();
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        assert_eq!(table.find_by_prefix_for_compression(&addr).unwrap().context_id, 4);
    }

    #[test]
    fn compression_skips_decompress_only_and_invalid() {
        let mut table = ContextTable::new();
        table.insert(entry(1, "2001:db8::", 64).decompress_only()).unwrap();
        table.insert(entry(2, "2001:db8::", 32)).unwrap();
        table.set_valid(ContextId::new(2), false);

        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        assert!(table.find_by_prefix_for_compression(&addr).is_none());
        assert!(table.find_by_id(ContextId::new(1)).is_some());
    }

    #[test]
    fn partial_byte_prefix_matching() {
        let e = entry(1, "2001:db8:ab80::", 41);
        assert!(e.matches(&"2001:db8:abff::1".parse().unwrap()));
        assert!(!e.matches(&"2001:db8:ab00::1".parse().unwrap()));
    }

    #[test]
    fn apply_prefix_overwrites_only_prefix_bits() {
        let e = entry(1, "2001:db8:ffff::", 36);
        let mut bytes = [0xaa; 16];
        e.apply_prefix(&mut bytes);
        assert_eq!(&bytes[..4], &[0x20, 0x01, 0x0d, 0xb8]);
        assert_eq!(bytes[4], 0xfa);
        assert_eq!(bytes[5], 0xaa);
    }

    #[test]
    fn multicast_prefix_lookup() {
        let mut table = ContextTable::new();
        table.insert(entry(2, "2001:db8:1234::", 48)).unwrap();
        let prefix = [0x20, 0x01, 0x0d, 0xb8, 0x12, 0x34, 0x00, 0x00];
        assert_eq!(table.find_multicast_prefix(48, &prefix).unwrap().context_id, 2);
        assert!(table.find_multicast_prefix(64, &prefix).is_none());
        let other = [0x20, 0x01, 0x0d, 0xb8, 0x12, 0x35, 0x00, 0x00];
        assert!(table.find_multicast_prefix(48, &other).is_none());
    }

    #[test]
    fn remove_and_clear() {
        let mut table = ContextTable::with_mesh_local_prefix("fd00::".parse().unwrap());
        table.insert(entry(1, "2001:db8::", 64)).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.remove(ContextId::new(1)).is_some());
        assert!(table.remove(ContextId::new(1)).is_none());
        assert!(table.remove(ContextId::new(200)).is_none());
        table.clear();
        assert!(table.is_empty());
    }
}
