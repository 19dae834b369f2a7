//! The callback surface a hook invokes when its transition predicate
//! matches an expression's evaluation change.

use std::fmt;

use rules_evaluator::ExpressionKey;
use rules_reservoir::Ternary;

/// Stable identity for a registered delegate, independent of its `Rc`
/// allocation, so hooks can be deduplicated by `(delegate_id, transition)`
/// and pruned once their delegate is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DelegateId(u64);

impl DelegateId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DelegateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A callback notified when a hooked expression makes a transition its
/// predicate accepts. Hooks hold delegates behind `Weak`, so a delegate
/// that is dropped elsewhere simply stops firing rather than panicking.
pub trait Delegate {
    /// Stable identity used for hook deduplication and dead-hook pruning.
    fn id(&self) -> DelegateId;

    /// Invoked with the expression that transitioned, its new
    /// evaluation, and the evaluation it transitioned from.
    fn notify(&self, expression_key: ExpressionKey, current: Ternary, last: Ternary);
}
