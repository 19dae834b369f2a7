//! A single `(transition predicate, priority, delegate)` subscription on
//! an expression.

use std::rc::{Rc, Weak};

use crate::delegate::{Delegate, DelegateId};
use crate::transition::TransitionPredicate;

/// One subscription registered against an expression. Holds its
/// delegate weakly, matching the single-threaded, `Rc`-owned object
/// model: a hook never keeps its delegate alive on its own.
pub struct Hook {
    transition: TransitionPredicate,
    priority: i32,
    delegate_id: DelegateId,
    delegate: Weak<dyn Delegate>,
}

impl Hook {
    #[must_use]
    pub fn new(transition: TransitionPredicate, priority: i32, delegate: &Rc<dyn Delegate>) -> Self {
        Self {
            transition,
            priority,
            delegate_id: delegate.id(),
            delegate: Rc::downgrade(delegate),
        }
    }

    #[must_use]
    pub const fn transition(&self) -> TransitionPredicate {
        self.transition
    }

    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub const fn delegate_id(&self) -> DelegateId {
        self.delegate_id
    }

    /// Returns the live delegate, or `None` if it has already been
    /// dropped elsewhere.
    #[must_use]
    pub fn delegate(&self) -> Option<Rc<dyn Delegate>> {
        self.delegate.upgrade()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.delegate.strong_count() > 0
    }
}
