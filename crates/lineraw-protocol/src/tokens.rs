//! Space-delimited token extraction from data units.
//!
//! Every dispatch layer reads exactly one data unit and splits it into a
//! fixed number of tokens. Tokens beyond what the unit contained are
//! represented as `None`, never as an empty string, so callers can tell "no
//! token" apart from "empty token".

use crate::errors::{LineRawError, ProtocolError};
use crate::reader::LineRawRead;

/// Splits one data unit on the first `count - 1` space characters.
///
/// The returned vector always has exactly `count` entries; missing trailing
/// tokens are back-filled with `None`.
///
/// # Errors
///
/// Returns [`ProtocolError::EmptyTokenLine`] when the unit contains no
/// non-empty token at all.
///
/// # Panics
///
/// Debug builds assert that `count` is at least one.
pub fn split_tokens(unit: &str, count: usize) -> Result<Vec<Option<String>>, ProtocolError> {
    debug_assert!(count > 0, "token split must look for at least one token");
    if unit.chars().all(|c| c == ' ') {
        return Err(ProtocolError::EmptyTokenLine);
    }
    let mut tokens: Vec<Option<String>> = unit
        .splitn(count, ' ')
        .map(|token| Some(token.to_owned()))
        .collect();
    tokens.resize(count, None);
    Ok(tokens)
}

/// Reads exactly one data unit and splits it into `count` tokens.
///
/// # Errors
///
/// Propagates read failures and [`ProtocolError::EmptyTokenLine`] for units
/// with no non-empty tokens.
pub fn read_tokens(
    input: &mut dyn LineRawRead,
    count: usize,
) -> Result<Vec<Option<String>>, LineRawError> {
    let unit = input.read_unit()?;
    Ok(split_tokens(&unit, count)?)
}

/// Reads one data unit and verifies it matches the expected marker.
///
/// Line-mode and raw-mode units are not distinguished: any unit whose bytes
/// equal the expected text passes.
///
/// # Errors
///
/// Returns [`ProtocolError::UnexpectedToken`] on mismatch and propagates
/// read failures.
pub fn expect_unit(input: &mut dyn LineRawRead, expected: &str) -> Result<(), LineRawError> {
    let actual = input.read_unit()?;
    if actual != expected {
        return Err(ProtocolError::unexpected_token(expected, actual).into());
    }
    Ok(())
}
