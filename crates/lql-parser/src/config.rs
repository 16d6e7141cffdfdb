//! Parser resource limits.

use serde::{Deserialize, Serialize};

/// Default cap on query text length in bytes (64 KiB).
pub const DEFAULT_MAX_QUERY_LEN: usize = 64 * 1024;

/// Default cap on parenthesis / function call / `NOT` nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 128;

/// Limits applied while parsing one statement.
///
/// Every field is optional when deserializing; missing fields take their
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Longer input fails with `InputTooLong` before lexing starts.
    pub max_query_len: usize,
    /// Deeper nesting fails with `NestingTooDeep`.
    pub max_nesting_depth: u32,
    /// Accept a single `;` after the statement.
    pub allow_trailing_semicolon: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_query_len: DEFAULT_MAX_QUERY_LEN,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            allow_trailing_semicolon: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.max_query_len, 65_536);
        assert_eq!(cfg.max_nesting_depth, 128);
        assert!(cfg.allow_trailing_semicolon);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: ParserConfig = match serde_json::from_str(r#"{"max_nesting_depth": 8}"#) {
            Ok(cfg) => cfg,
            Err(err) => unreachable!("config should deserialize: {err}"),
        };
        assert_eq!(cfg.max_nesting_depth, 8);
        assert_eq!(cfg.max_query_len, DEFAULT_MAX_QUERY_LEN);
        assert!(cfg.allow_trailing_semicolon);
    }
}
