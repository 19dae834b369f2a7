//! Opaque status/chunk identifiers.
//!
//! Keys are produced by a caller-supplied hash over names. Zero is
//! reserved as the "no key" sentinel and is never a valid entity.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Sentinel value meaning "no key". Never intern a real entity under it.
pub const NO_KEY: u64 = 0;

macro_rules! opaque_key {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Builds a key from a name via the crate's default deterministic
            /// hasher. Two calls with the same name always produce the same
            /// key within a process and across processes (unlike
            /// `RandomState`, `DefaultHasher::new()` is unseeded).
            #[must_use]
            pub fn from_name(name: &str) -> Self {
                let mut hasher = DefaultHasher::new();
                name.hash(&mut hasher);
                Self::from_raw(hasher.finish())
            }

            /// Builds a key from a raw hash value supplied by the caller.
            /// `0` is logged and accepted but is never a valid entity key.
            #[must_use]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the underlying integer value.
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }

            /// Returns `true` if this is the sentinel "no key" value.
            #[must_use]
            pub const fn is_sentinel(self) -> bool {
                self.0 == NO_KEY
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:#018x})", stringify!($name), self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(NO_KEY)
            }
        }
    };
}

opaque_key!(StatusKey);
opaque_key!(ChunkKey);
