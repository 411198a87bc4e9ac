//! Address trace parsing.
//!
//! One access per line: `R <addr>`, `W <addr>`, or `I <addr>` (invalidate). Addresses are
//! hex with a `0x` prefix or decimal. Blank lines and `#` comments are skipped.

use std::num::ParseIntError;

use thiserror::Error;

/// One trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOp {
    /// Load from an address.
    Read(u64),
    /// Store to an address.
    Write(u64),
    /// Invalidate the line holding an address.
    Invalidate(u64),
}

/// A malformed trace line.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The operation letter is not R, W, or I.
    #[error("line {line}: unknown operation '{op}'")]
    UnknownOp {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        op: String,
    },
    /// The line has no address field.
    #[error("line {line}: missing address")]
    MissingAddress {
        /// 1-based line number.
        line: usize,
    },
    /// The address field is not a number.
    #[error("line {line}: bad address '{text}': {source}")]
    BadAddress {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        text: String,
        /// Underlying parse failure.
        source: ParseIntError,
    },
    /// Something follows the address on the same line.
    #[error("line {line}: unexpected field '{text}' after address")]
    TrailingField {
        /// 1-based line number.
        line: usize,
        /// First extra token.
        text: String,
    },
}

fn parse_addr(text: &str) -> Result<u64, ParseIntError> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    }
}

/// Parses a whole trace.
///
/// # Errors
///
/// Returns the first [`TraceError`] encountered.
pub fn parse(input: &str) -> Result<Vec<TraceOp>, TraceError> {
    let mut ops = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let mut fields = content.split_whitespace();
        let kind: fn(u64) -> TraceOp = match fields.next().unwrap_or_default() {
            "R" | "r" => TraceOp::Read,
            "W" | "w" => TraceOp::Write,
            "I" | "i" => TraceOp::Invalidate,
            other => {
                return Err(TraceError::UnknownOp {
                    line,
                    op: other.to_string(),
                });
            }
        };
        let text = fields.next().ok_or(TraceError::MissingAddress { line })?;
        let addr = parse_addr(text).map_err(|source| TraceError::BadAddress {
            line,
            text: text.to_string(),
            source,
        })?;
        if let Some(extra) = fields.next() {
            return Err(TraceError::TrailingField {
                line,
                text: extra.to_string(),
            });
        }
        ops.push(kind(addr));
    }
    Ok(ops)
}
