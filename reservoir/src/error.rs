//! Typed, local error taxonomy for the reservoir crate.
//!
//! These exist for diagnostics and logging; the public API still returns
//! the plain `bool`/`Option`/`Ternary` sentinels the caller is expected to
//! handle (see the crate's module docs and callers in `evaluator`/
//! `dispatch`).

use crate::key::{ChunkKey, StatusKey};

/// Errors produced internally by reservoir operations. Never panics on
/// user input; only invariant violations are assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservoirError {
    /// Registering a status key that already exists.
    DuplicateStatus(StatusKey),
    /// Looking up a status key that does not exist.
    UnknownStatus(StatusKey),
    /// Looking up a chunk key that does not exist.
    UnknownChunk(ChunkKey),
    /// A declared integer width is out of the `2..=64` range.
    InvalidWidth(u8),
    /// A value does not fit the declared bit width.
    WidthOverflow,
    /// An allocation request exceeds a single bit-block's width.
    AllocationTooWide(u8),
    /// A bit position/width pair does not address a valid in-bounds,
    /// single-block region.
    OutOfRange,
    /// A type-incompatible comparison or assignment.
    KindMismatch,
    /// Division or modulo by zero.
    DivideByZero,
}

impl std::fmt::Display for ReservoirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservoirError::DuplicateStatus(key) => {
                write!(f, "status {key} is already registered")
            }
            ReservoirError::UnknownStatus(key) => write!(f, "status {key} is not registered"),
            ReservoirError::UnknownChunk(key) => write!(f, "chunk {key} is not registered"),
            ReservoirError::InvalidWidth(width) => {
                write!(f, "bit width {width} is out of range 2..=64")
            }
            ReservoirError::WidthOverflow => write!(f, "value does not fit the declared width"),
            ReservoirError::AllocationTooWide(width) => {
                write!(f, "allocation of {width} bits exceeds one bit-block")
            }
            ReservoirError::OutOfRange => write!(f, "bit position/width is out of range"),
            ReservoirError::KindMismatch => write!(f, "incompatible status value kinds"),
            ReservoirError::DivideByZero => write!(f, "division or modulo by zero"),
        }
    }
}

impl std::error::Error for ReservoirError {}
