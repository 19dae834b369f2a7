//! Token decoders for the `CONDITION` and `ARGUMENT` handler-row columns.

use crate::accumulator::DelayPolicy;
use crate::transition::{self, TransitionPredicate};

fn parse_condition_token(token: &str) -> Option<u8> {
    match token {
        "True" => Some(transition::TRUE),
        "False" => Some(transition::FALSE),
        "Failed" | "Null" => Some(transition::FAILED),
        "NotTrue" | "!True" => Some(transition::NOT_TRUE),
        "NotFalse" | "!False" => Some(transition::NOT_FALSE),
        "NotFailed" | "!Null" => Some(transition::NOT_FAILED),
        "Any" => Some(transition::ANY),
        _ => None,
    }
}

/// Decodes the `CONDITION` column's two single-evaluation predicate
/// tokens (current, last) into a packed transition predicate.
#[must_use]
pub fn parse_condition_tokens(current_token: &str, last_token: &str) -> Option<TransitionPredicate> {
    let current_mask = parse_condition_token(current_token)?;
    let last_mask = parse_condition_token(last_token)?;
    TransitionPredicate::new(current_mask, last_mask).ok()
}

/// Decodes the accumulator `ARGUMENT` delay token.
#[must_use]
pub fn parse_delay(token: &str) -> Option<DelayPolicy> {
    match token {
        "Follow" => Some(DelayPolicy::Follow),
        "Yield" => Some(DelayPolicy::Yield),
        "Block" => Some(DelayPolicy::Block),
        "Nonblock" => Some(DelayPolicy::Nonblock),
        _ => None,
    }
}
