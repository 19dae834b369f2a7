//! Dispatch: monitors, hooks, the deferred write queue, and the per-tick
//! engine that ties `rules_reservoir` and `rules_evaluator` together.
//!
//! Depends on `rules_reservoir` and `rules_evaluator`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accumulator;
pub mod delegate;
pub mod dispatcher;
pub mod error;
pub mod expression_monitor;
pub mod hook;
pub mod parsing;
pub mod status_monitor;
pub mod transition;

pub use accumulator::{Accumulator, DelayPolicy};
pub use delegate::{Delegate, DelegateId};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::DispatchError;
pub use expression_monitor::ExpressionMonitor;
pub use hook::Hook;
pub use status_monitor::{DirtyKind, StatusMonitor};
pub use transition::TransitionPredicate;
