//! `Reservoir`: the map {`StatusKey` -> (chunk, bit position, bit-format,
//! dirty-flag)} plus the map {`ChunkKey` -> `StatusChunk`}, and the
//! register/read/write/compare API that drives both.

use std::collections::BTreeMap;

use crate::chunk::StatusChunk;
use crate::error::ReservoirError;
use crate::key::{ChunkKey, StatusKey};
use crate::property::StatusProperty;
use crate::ternary::Ternary;
use crate::value::{AssignOp, CompareOp, Kind, StatusValue};

/// The right-hand side of an assignment or comparison: either a literal
/// value or a reference to another status key, resolved at call time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rhs {
    Literal(StatusValue),
    Status(StatusKey),
}

/// A queued or immediate status assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusAssignment {
    pub key: StatusKey,
    pub op: AssignOp,
    pub rhs: Rhs,
}

/// A status-to-status or status-to-literal comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusComparison {
    pub left: StatusKey,
    pub op: CompareOp,
    pub right: Rhs,
}

/// Construction-time tuning for a `Reservoir`. Capacities are hints only
/// (`BTreeMap`s grow unbounded); they exist so callers with a known
/// status/chunk count can avoid incremental rehashing, mirroring the
/// `sterling-search` `SearchPolicyV1` default-plus-validate shape.
#[derive(Debug, Clone, Copy)]
pub struct ReservoirConfig {
    /// Expected number of distinct status keys, used only as a log hint.
    pub expected_statuses: usize,
    /// Expected number of distinct chunks, used only as a log hint.
    pub expected_chunks: usize,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            expected_statuses: 64,
            expected_chunks: 4,
        }
    }
}

/// The bit-packed, typed state store.
#[derive(Debug)]
pub struct Reservoir {
    config: ReservoirConfig,
    chunks: BTreeMap<ChunkKey, StatusChunk>,
    statuses: BTreeMap<StatusKey, StatusProperty>,
}

impl Reservoir {
    #[must_use]
    pub fn new(config: ReservoirConfig) -> Self {
        log::debug!(
            "reservoir initialized (expected_statuses={}, expected_chunks={})",
            config.expected_statuses,
            config.expected_chunks
        );
        Self {
            config,
            chunks: BTreeMap::new(),
            statuses: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ReservoirConfig {
        &self.config
    }

    fn alloc_width(kind: Kind) -> Option<u8> {
        match kind {
            Kind::Empty => None,
            Kind::Bool => Some(1),
            Kind::Float => Some(64),
            Kind::Unsigned(w) | Kind::Signed(w) => Some(w),
        }
    }

    /// Registers a new status in `chunk_key` with `initial_value`. Fails
    /// (returns `false`, state unchanged) if `status_key` already exists
    /// or `initial_value` is `Empty`. The chunk is created lazily if this
    /// is its first status.
    pub fn register_status(
        &mut self,
        chunk_key: ChunkKey,
        status_key: StatusKey,
        initial_value: StatusValue,
    ) -> bool {
        if self.statuses.contains_key(&status_key) {
            log::debug!("duplicate status registration rejected: {status_key}");
            return false;
        }
        let Some(width) = Self::alloc_width(initial_value.kind()) else {
            log::debug!("cannot register status {status_key} with Empty initial value");
            return false;
        };
        let chunk = self.chunks.entry(chunk_key).or_default();
        let Ok(bit_position) = chunk.allocate(width) else {
            log::warn!("allocation failed for status {status_key} in chunk {chunk_key}");
            return false;
        };
        // Registration writes the initial bits directly; it must not set
        // the transition flag (only real value-changing assignments do).
        chunk.set(bit_position, width, initial_value.to_bits());
        let bit_format = crate::value::bit_format_byte(initial_value.kind());
        self.statuses
            .insert(status_key, StatusProperty::new(chunk_key, bit_position, bit_format));
        true
    }

    /// Returns a value-snapshot of `status_key`, or `StatusValue::Empty`
    /// if unknown.
    #[must_use]
    pub fn find_status(&self, status_key: StatusKey) -> StatusValue {
        let Some(property) = self.statuses.get(&status_key) else {
            return StatusValue::Empty;
        };
        let Some(chunk) = self.chunks.get(&property.chunk_key()) else {
            return StatusValue::Empty;
        };
        let Some(kind) = crate::value::kind_from_bit_format(property.bit_format()) else {
            return StatusValue::Empty;
        };
        let Some(width) = Self::alloc_width(kind) else {
            return StatusValue::Empty;
        };
        let Ok(bits) = chunk.get(property.bit_position(), width) else {
            return StatusValue::Empty;
        };
        StatusValue::from_bits(kind, bits)
    }

    #[must_use]
    pub fn find_property(&self, status_key: StatusKey) -> Option<&StatusProperty> {
        self.statuses.get(&status_key)
    }

    /// The stable one-byte kind+width encoding for `status_key` (§6),
    /// or `None` if the status is unknown. `make_kind`/`make_bit_width`
    /// recover the original `Kind` and width from the returned byte.
    #[must_use]
    pub fn find_bit_format(&self, status_key: StatusKey) -> Option<u8> {
        self.statuses.get(&status_key).map(StatusProperty::bit_format)
    }

    /// `True` iff the transition flag is set; `False` iff the status
    /// exists and the flag is clear; `Failed` iff the status is unknown.
    #[must_use]
    pub fn find_transition(&self, status_key: StatusKey) -> Ternary {
        match self.statuses.get(&status_key) {
            Some(property) if property.transition_flag() => Ternary::True,
            Some(_) => Ternary::False,
            None => Ternary::Failed,
        }
    }

    fn resolve(&self, rhs: Rhs) -> StatusValue {
        match rhs {
            Rhs::Literal(value) => value,
            Rhs::Status(key) => self.find_status(key),
        }
    }

    /// Applies `assignment`. On a bit-level change, sets the transition
    /// flag. Overflow, kind mismatches, and divide-by-zero leave the
    /// store unchanged and return `false`.
    pub fn assign_status(&mut self, assignment: StatusAssignment) -> bool {
        let current = self.find_status(assignment.key);
        if matches!(current, StatusValue::Empty) {
            log::debug!("assignment to unknown status {} rejected", assignment.key);
            return false;
        }
        let rhs_value = self.resolve(assignment.rhs);
        let next = match current.assign(assignment.op, rhs_value) {
            Ok(next) => next,
            Err(error) => {
                log::debug!("assignment to {} failed: {error}", assignment.key);
                return false;
            }
        };

        let Some(property) = self.statuses.get(&assignment.key).copied() else {
            return false;
        };
        let Some(chunk) = self.chunks.get_mut(&property.chunk_key()) else {
            return false;
        };
        let width = Self::alloc_width(next.kind()).unwrap_or(0);
        let changed = chunk.set(property.bit_position(), width, next.to_bits());
        if changed.is_true() {
            if let Some(property) = self.statuses.get_mut(&assignment.key) {
                property.transition_flag = true;
            }
        }
        !changed.is_failed()
    }

    /// Compares a status against a literal or another status.
    #[must_use]
    pub fn compare_status(&self, comparison: StatusComparison) -> Ternary {
        let left = self.find_status(comparison.left);
        let right = self.resolve(comparison.right);
        left.compare(comparison.op, right)
    }

    /// Clears every property's transition flag. Called exactly once per
    /// tick by the dispatcher, after expression evaluation and before
    /// delegate invocation.
    pub fn reset_transitions(&mut self) {
        for property in self.statuses.values_mut() {
            property.transition_flag = false;
        }
    }

    /// Removes `chunk_key` and every status property filed under it.
    pub fn remove_chunk(&mut self, chunk_key: ChunkKey) -> bool {
        if self.chunks.remove(&chunk_key).is_none() {
            log::debug!("remove_chunk on unknown chunk {chunk_key}");
            return false;
        }
        self.statuses.retain(|_, property| property.chunk_key() != chunk_key);
        true
    }
}
