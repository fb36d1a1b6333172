//! Error Types
//!
//! Typed failures for table construction and store queries.

use thiserror::Error;

/// Top-level error type for embedding operations.
///
/// Queries never return sentinel values (NaN, empty results) in place of
/// failing; every failure surfaces as one of these variants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmbeddingError {
    /// Malformed construction input: empty vocabulary, ragged or empty
    /// value buffer, duplicate words, non-finite components.
    #[error("invalid embedding data: {0}")]
    InvalidData(String),

    /// A query referenced a word absent from the vocabulary. Recoverable:
    /// the UI layer matches on this variant to show "word not found".
    #[error("unknown word: {word}")]
    UnknownWord { word: String },

    /// Out-of-range parameter: zero neighbor count, degenerate axis.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmbeddingError::UnknownWord {
            word: "zzznotaword".to_string(),
        };
        assert!(err.to_string().contains("unknown word"));
        assert!(err.to_string().contains("zzznotaword"));
    }

    #[test]
    fn test_invalid_data_display() {
        let err = EmbeddingError::InvalidData("vocabulary is empty".to_string());
        assert!(err.to_string().contains("invalid embedding data"));
    }
}
