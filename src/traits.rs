//! Core codec traits.
//!
//! The codec never owns compression contexts. The network-data layer does,
//! and hands a read-only view to every compress/decompress call through
//! [`ContextLookup`]. [`ContextTable`](crate::context_manager::ContextTable)
//! is the stock implementation; integrations with their own storage can
//! implement the trait directly.

use std::fmt::Debug;
use std::net::Ipv6Addr;

use crate::context_manager::ContextEntry;
use crate::types::ContextId;

/// Read-only access to the compression contexts shared by a 6LoWPAN network.
pub trait ContextLookup: Debug {
    /// Returns the longest valid, compression-enabled context whose prefix
    /// covers `address`. Ties on prefix length go to the lowest context id.
    ///
    /// `None` means the caller falls back to stateless or inline encoding.
    fn find_by_prefix_for_compression(&self, address: &Ipv6Addr) -> Option<ContextEntry>;

    /// Returns the valid context named `context_id`.
    ///
    /// During decompression `None` is a hard failure for the packet.
    fn find_by_id(&self, context_id: ContextId) -> Option<ContextEntry>;

    /// Returns a valid, compression-enabled context able to stand in for the
    /// network prefix embedded in a unicast-prefix-based multicast address
    /// (RFC 3306): same prefix length and the same leading `prefix_length` bits.
    ///
    /// Only prefixes up to 64 bits qualify.
    fn find_multicast_prefix(&self, prefix_length: u8, prefix: &[u8; 8]) -> Option<ContextEntry>;
}
