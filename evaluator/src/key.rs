//! Opaque expression identifier, same shape as `rules_reservoir`'s keys
//! (kept as a separate newtype so `StatusKey` and `ExpressionKey` are
//! never accidentally interchangeable).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Sentinel value meaning "no key".
pub const NO_KEY: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpressionKey(u64);

impl ExpressionKey {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::from_raw(hasher.finish())
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        self.0 == NO_KEY
    }
}

impl std::fmt::Display for ExpressionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExpressionKey({:#018x})", self.0)
    }
}

impl Default for ExpressionKey {
    fn default() -> Self {
        Self(NO_KEY)
    }
}
