//! Per-expression bookkeeping: dirty flags, the sticky flush bit, the
//! last-seen evaluation, and the hooks subscribed to this expression.

use rules_reservoir::Ternary;

use crate::hook::Hook;

/// State attached to one expression: dirty/flush/last-evaluation flags
/// plus its registered hooks.
#[derive(Default)]
pub struct ExpressionMonitor {
    dirty_valid: bool,
    dirty_invalid: bool,
    last_evaluation: bool,
    last_condition: bool,
    flush: bool,
    dependencies_registered: bool,
    hooks: Vec<Hook>,
}

impl ExpressionMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn dependencies_registered(&self) -> bool {
        self.dependencies_registered
    }

    /// Marks dependency wiring as done and sets the sticky flush bit iff
    /// `contains_status_transition` was true for this expression at wiring
    /// time. Never clears `flush` once set.
    pub fn mark_dependencies_registered(&mut self, contains_status_transition: bool) {
        self.dependencies_registered = true;
        if contains_status_transition {
            self.flush = true;
        }
    }

    pub fn mark_dirty_valid(&mut self) {
        self.dirty_valid = true;
    }

    pub fn mark_dirty_invalid(&mut self) {
        self.dirty_invalid = true;
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty_valid || self.dirty_invalid
    }

    #[must_use]
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Registers a hook. Fails if an identical `(delegate, transition)`
    /// hook is already present.
    pub fn add_hook(&mut self, hook: Hook) -> bool {
        let duplicate = self.hooks.iter().any(|existing| {
            existing.delegate_id() == hook.delegate_id()
                && existing.transition().byte() == hook.transition().byte()
        });
        if duplicate {
            return false;
        }
        self.hooks.push(hook);
        true
    }

    /// Drops hooks whose delegate has been dropped elsewhere.
    pub fn prune_dead_hooks(&mut self) {
        self.hooks.retain(Hook::is_alive);
    }

    /// The `last_eval` this tick sees, per the evaluation rule: `Failed`
    /// if no non-failing evaluation has ever been recorded, else
    /// `LastCondition`'s value, except that the sticky flush bit forces
    /// `False` for this tick only (it never forces `Failed`).
    #[must_use]
    pub fn last_eval(&self) -> Ternary {
        if !self.last_evaluation {
            return Ternary::Failed;
        }
        if self.flush {
            return Ternary::False;
        }
        if self.last_condition {
            Ternary::True
        } else {
            Ternary::False
        }
    }

    /// Updates `LastEvaluation`/`LastCondition` from `current_eval`, and
    /// clears `DirtyValid`/`DirtyInvalid` for the next tick. `Flush` is
    /// not touched here: once set at registration time it stays set for
    /// the expression's lifetime, so a bare status-transition expression
    /// keeps reporting `last_eval = False` (never `True`) on every tick,
    /// letting it re-fire each time the watched transition recurs.
    pub fn record_evaluation(&mut self, current_eval: Ternary) {
        match current_eval {
            Ternary::Failed => self.last_evaluation = false,
            Ternary::True => {
                self.last_evaluation = true;
                self.last_condition = true;
            }
            Ternary::False => {
                self.last_evaluation = true;
                self.last_condition = false;
            }
        }
        self.dirty_valid = false;
        self.dirty_invalid = false;
    }
}
