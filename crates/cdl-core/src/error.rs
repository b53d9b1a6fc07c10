//! Error types for the CDL front end
//!
//! All fallible operations return `Result<T, Error>`.
//! There is exactly one failure mode — a grammar violation — and it always
//! carries the index of the offending token plus a tag naming the construct
//! the parser expected there. Callers decide whether to abort, log, or
//! report; the library never terminates the process.

use serde::{Deserialize, Serialize};

/// The construct a `require_*` check was looking for when it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expected {
    /// An identifier token
    Identifier,
    /// A number token
    Number,
    /// A string token
    Str,
    /// A specific punctuation character
    Char(char),
    /// A specific lexeme (keyword or multi-character symbol)
    Lexeme(String),
    /// A recognized top-level or member-level construct
    Construct,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Expected::Identifier => write!(f, "identifier"),
            Expected::Number => write!(f, "number"),
            Expected::Str => write!(f, "string"),
            Expected::Char(c) => write!(f, "'{}'", c),
            Expected::Lexeme(s) => write!(f, "'{}'", s),
            Expected::Construct => write!(f, "construct"),
        }
    }
}

/// CDL front-end error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Grammar violation during parsing — fail-fast, no partial tree
    #[error("Error (token {position}): {message}")]
    Grammar {
        message: String,
        position: usize,
        expected: Expected,
    },
}

impl Error {
    pub fn grammar(message: impl Into<String>, position: usize, expected: Expected) -> Self {
        Error::Grammar {
            message: message.into(),
            position,
            expected,
        }
    }

    /// Token index the parser stopped at.
    pub fn position(&self) -> usize {
        match self {
            Error::Grammar { position, .. } => *position,
        }
    }
}

/// Result type alias for CDL operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_position() {
        let err = Error::grammar("Expecting type, but found '}'.", 7, Expected::Identifier);
        assert_eq!(
            err.to_string(),
            "Error (token 7): Expecting type, but found '}'."
        );
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn test_expected_display() {
        assert_eq!(Expected::Char(';').to_string(), "';'");
        assert_eq!(Expected::Lexeme("contract".into()).to_string(), "'contract'");
        assert_eq!(Expected::Identifier.to_string(), "identifier");
    }
}
