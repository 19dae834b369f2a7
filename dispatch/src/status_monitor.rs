//! Reverse dependency index from a status to the expressions that read
//! it, so a status transition only disturbs the expressions that
//! actually depend on it.

use rules_evaluator::{Evaluator, ExpressionKey};
use rules_reservoir::Ternary;

/// Which dirty flag a status transition should set on a dependent
/// expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyKind {
    Valid,
    Invalid,
}

/// Tracks the sorted, deduplicated set of expressions that depend on a
/// single status, plus whether that status existed in the reservoir as
/// of the last tick.
#[derive(Debug, Default)]
pub struct StatusMonitor {
    sorted_unique_expression_keys: Vec<ExpressionKey>,
    last_existence: bool,
}

impl StatusMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `expression_key` at its sorted position. No-op if already
    /// present.
    pub fn insert_expression_key(&mut self, expression_key: ExpressionKey) {
        if let Err(index) = self.sorted_unique_expression_keys.binary_search(&expression_key) {
            self.sorted_unique_expression_keys.insert(index, expression_key);
        }
    }

    #[must_use]
    pub fn expression_keys(&self) -> &[ExpressionKey] {
        &self.sorted_unique_expression_keys
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted_unique_expression_keys.is_empty()
    }

    /// Drops dependents whose expression was removed from `evaluator`.
    /// Returns `true` once the monitor has no dependents left, so the
    /// caller can drop it from its map.
    pub fn shrink_expression_keys(&mut self, evaluator: &Evaluator) -> bool {
        self.sorted_unique_expression_keys
            .retain(|key| evaluator.find_expression(*key).is_some());
        self.sorted_unique_expression_keys.is_empty()
    }

    /// Called once per tick with `reservoir.find_transition(status_key)`
    /// for the status this monitor tracks (`Failed` = status missing,
    /// `True` = transitioned this tick, `False` = present and
    /// unchanged). Marks every dependent via `mark_dirty` with
    /// `DirtyKind::Invalid` if the status just disappeared, or
    /// `DirtyKind::Valid` if it transitioned or just reappeared; does
    /// nothing otherwise. Updates `last_existence`.
    pub fn propagate(&mut self, transition: Ternary, mut mark_dirty: impl FnMut(ExpressionKey, DirtyKind)) {
        let exists = !transition.is_failed();
        let appeared = exists && !self.last_existence;

        if transition.is_failed() && self.last_existence {
            for &key in &self.sorted_unique_expression_keys {
                mark_dirty(key, DirtyKind::Invalid);
            }
        } else if transition.is_true() || appeared {
            for &key in &self.sorted_unique_expression_keys {
                mark_dirty(key, DirtyKind::Valid);
            }
        }

        self.last_existence = exists;
    }
}
