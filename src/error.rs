//! Error type shared by the codec and the trees.

use std::fmt;

/// Errors returned by the symbol codec and tree operations.
///
/// Absence is never an error: lookups report it as `Ok(None)` and counts
/// as `Ok(0)`. Every error is raised before a tree is touched, so a failed
/// call leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// A character outside {N, A, T, C, G}. `position` is the character index.
    InvalidSymbol { symbol: char, position: usize },
    /// Malformed query or insertion input.
    InvalidArgument(String),
    /// A tree (usually a deserialized one) breaks a structural invariant.
    MalformedTree(String),
}

impl fmt::Display for TrieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrieError::InvalidSymbol { symbol, position } => {
                write!(
                    f,
                    "invalid symbol {:?} at position {} (expected one of N, A, T, C, G)",
                    symbol, position
                )
            }
            TrieError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            TrieError::MalformedTree(msg) => write!(f, "malformed tree: {}", msg),
        }
    }
}

impl std::error::Error for TrieError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_symbol_and_position() {
        let err = TrieError::InvalidSymbol {
            symbol: 'X',
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid symbol 'X' at position 3 (expected one of N, A, T, C, G)"
        );
    }

    #[test]
    fn test_errors_convert_to_anyhow() {
        let err: anyhow::Error = TrieError::InvalidArgument("empty word".into()).into();
        assert_eq!(err.to_string(), "invalid argument: empty word");
    }
}
