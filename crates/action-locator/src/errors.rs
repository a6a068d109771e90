//! Error types for selector parsing

use thiserror::Error;

/// Selector parse error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Pattern (or one of its list entries) has no content
    #[error("empty selector")]
    Empty,

    /// Character that cannot start or continue a selector
    #[error("unexpected '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    /// Input ended where more was required
    #[error("unexpected end of selector")]
    UnexpectedEnd,

    /// Quoted attribute value never closed
    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: usize },

    /// Identifier required after `#`, `.` or `[`
    #[error("expected identifier at {pos}")]
    ExpectedIdent { pos: usize },
}
