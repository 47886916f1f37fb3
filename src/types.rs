//! Core type definitions for the 6LoWPAN codec.
//!
//! Provides zero-cost newtypes to prevent field mixups at compile time.
//! All types use `#[repr(transparent)]` for guaranteed zero runtime cost.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Macro to generate newtype wrappers with common implementations
macro_rules! lowpan_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
        $(, custom_methods: { $($custom:tt)* })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            $($($custom)*)?
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for $inner {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }

        impl PartialOrd<$inner> for $name {
            #[inline]
            fn partial_cmp(&self, other: &$inner) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }
    };
}

lowpan_newtype!(
    /// Compression context identifier (4 bits on the wire).
    ContextId(u8) => "CID",
    custom_methods: {
        /// True for ids that fit the 4-bit context extension nibble.
        #[inline]
        pub const fn is_valid(self) -> bool {
            self.0 <= Self::MAX.0
        }
    }
);

lowpan_newtype!(
    /// IPv6 flow label (low 20 bits significant).
    FlowLabel(u32) => "FL",
    custom_methods: {
        /// Keeps only the 20 bits the IPv6 header carries.
        #[inline]
        pub const fn masked(self) -> Self {
            Self(self.0 & 0x000F_FFFF)
        }
    }
);

impl ContextId {
    /// Mesh-local prefix context, usable without a context extension byte.
    pub const MESH_LOCAL: Self = Self::new(0);
    /// Largest id a context extension nibble can name.
    pub const MAX: Self = Self::new(15);
}
