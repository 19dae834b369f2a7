//! Text-token decoding helpers for external table-row builders.
//!
//! These are pure `&str -> Option<T>` functions; they do not iterate a
//! table or own a schema. Building the row/table ingestion layer itself
//! is out of scope.

use crate::value::{AssignOp, CompareOp, Kind, StatusValue};

/// Decodes a `KIND` token (`Bool`, `Float`, `Unsigned_<width>`,
/// `Signed_<width>`) paired with a `VALUE` token into a `StatusValue`.
///
/// `VALUE` accepts `true`/`false`, decimal integers (optional leading
/// sign), `0x` hex, `0b` binary, `0o` octal, and scientific-notation
/// floats.
#[must_use]
pub fn parse_status_value(kind_token: &str, value_token: &str) -> Option<StatusValue> {
    let kind = parse_kind_token(kind_token)?;
    match kind {
        Kind::Bool => parse_bool_token(value_token).map(StatusValue::Bool),
        Kind::Float => value_token.parse::<f64>().ok().map(StatusValue::Float),
        Kind::Unsigned(width) => {
            parse_integer_token(value_token)?.try_into().ok().and_then(|value: u64| {
                StatusValue::new_unsigned(value, width).ok()
            })
        }
        Kind::Signed(width) => {
            parse_integer_token(value_token)?.try_into().ok().and_then(|value: i64| {
                StatusValue::new_signed(value, width).ok()
            })
        }
        Kind::Empty => None,
    }
}

fn parse_kind_token(token: &str) -> Option<Kind> {
    if token == "Bool" {
        return Some(Kind::Bool);
    }
    if token == "Float" {
        return Some(Kind::Float);
    }
    if let Some(width) = token.strip_prefix("Unsigned_") {
        return width.parse::<u8>().ok().map(Kind::Unsigned);
    }
    if let Some(width) = token.strip_prefix("Signed_") {
        return width.parse::<u8>().ok().map(Kind::Signed);
    }
    None
}

fn parse_bool_token(token: &str) -> Option<bool> {
    match token {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parses a decimal/hex (`0x`)/octal (`0o`)/binary (`0b`) integer token,
/// with an optional leading sign, into an `i128` (wide enough to hold
/// any `Unsigned`/`Signed` value up to 64 bits before range-checking).
fn parse_integer_token(token: &str) -> Option<i128> {
    let (negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let magnitude = if let Some(hex) = rest.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = rest.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).ok()?
    } else if let Some(oct) = rest.strip_prefix("0o") {
        i128::from_str_radix(oct, 8).ok()?
    } else {
        rest.parse::<i128>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Decodes a comparison-operator token (`==`, `!=`, `<`, `<=`, `>`, `>=`).
#[must_use]
pub fn parse_compare_op(token: &str) -> Option<CompareOp> {
    CompareOp::parse(token)
}

/// Decodes an assignment-operator token (`:=`, `+=`, `-=`, `*=`, `/=`,
/// `%=`, `|=`, `^=`, `&=`).
#[must_use]
pub fn parse_assign_op(token: &str) -> Option<AssignOp> {
    AssignOp::parse(token)
}
