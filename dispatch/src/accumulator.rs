//! Deferred, ordered write queue: buffers assignments submitted during a
//! tick and applies them at the next tick boundary under a per-entry
//! delay policy.

use std::collections::HashSet;

use rules_reservoir::{Reservoir, StatusAssignment, StatusKey};

/// Per-entry delay discipline, decoded from the `ARGUMENT` handler-row
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Apply unconditionally, in the same flush slot as the previous
    /// entry; never gates later entries.
    Follow,
    /// Apply unless its status key was already touched this flush; if
    /// touched, defer to the next flush.
    Yield,
    /// Like `Yield`, but also defers every subsequent queued entry to a
    /// later flush once it defers.
    Block,
    /// Apply unconditionally.
    Nonblock,
}

struct Entry {
    assignment: StatusAssignment,
    delay: DelayPolicy,
}

/// FIFO queue of pending status assignments, flushed once per tick.
#[derive(Default)]
pub struct Accumulator {
    pending: Vec<Entry>,
}

impl Accumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, assignment: StatusAssignment, delay: DelayPolicy) {
        self.pending.push(Entry { assignment, delay });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies one flush pass against `reservoir`, honoring each entry's
    /// delay policy, and retains the un-applied tail for the next tick.
    pub fn flush(&mut self, reservoir: &mut Reservoir) {
        let entries = std::mem::take(&mut self.pending);
        let mut touched: HashSet<StatusKey> = HashSet::new();
        let mut blocked = false;
        let mut deferred = Vec::new();

        for entry in entries {
            if blocked {
                deferred.push(entry);
                continue;
            }
            match entry.delay {
                DelayPolicy::Nonblock => {
                    reservoir.assign_status(entry.assignment);
                    touched.insert(entry.assignment.key);
                }
                DelayPolicy::Follow => {
                    reservoir.assign_status(entry.assignment);
                }
                DelayPolicy::Yield => {
                    if touched.contains(&entry.assignment.key) {
                        deferred.push(entry);
                    } else {
                        reservoir.assign_status(entry.assignment);
                        touched.insert(entry.assignment.key);
                    }
                }
                DelayPolicy::Block => {
                    if touched.contains(&entry.assignment.key) {
                        blocked = true;
                        deferred.push(entry);
                    } else {
                        reservoir.assign_status(entry.assignment);
                        touched.insert(entry.assignment.key);
                    }
                }
            }
        }

        self.pending = deferred;
    }
}
