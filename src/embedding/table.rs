//! Embedding Table
//!
//! Immutable word -> vector matrix with row index.

use hashbrown::HashMap;

use crate::error::{EmbeddingError, Result};

use super::similarity::normalize_in_place;

/// Word vocabulary plus a row-major flat matrix of embedding vectors.
///
/// Constructed once from externally supplied data and immutable afterwards.
/// Word lookup is exact and case-sensitive; cleaning (lowercasing,
/// underscore-to-space) is the loader's responsibility.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    /// Vocabulary in row order
    words: Vec<String>,
    /// Row-major matrix, `words.len() * dim` values
    values: Vec<f32>,
    /// Word -> row number
    index: HashMap<String, usize>,
    /// Fixed dimensionality of every row
    dim: usize,
}

impl EmbeddingTable {
    /// Build a table from a vocabulary and a flat value buffer.
    ///
    /// The dimensionality is inferred as `values.len() / words.len()`.
    /// Fails with `InvalidData` when the vocabulary is empty, the buffer
    /// is empty or ragged, a word repeats, or a component is non-finite.
    pub fn new(words: Vec<String>, values: Vec<f32>) -> Result<Self> {
        if words.is_empty() {
            return Err(EmbeddingError::InvalidData(
                "vocabulary is empty".to_string(),
            ));
        }
        if values.is_empty() || values.len() % words.len() != 0 {
            return Err(EmbeddingError::InvalidData(format!(
                "value buffer length {} does not evenly cover {} words",
                values.len(),
                words.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(EmbeddingError::InvalidData(format!(
                "non-finite component at offset {}",
                pos
            )));
        }

        let dim = values.len() / words.len();
        let mut index = HashMap::with_capacity(words.len());
        for (row, word) in words.iter().enumerate() {
            if index.insert(word.clone(), row).is_some() {
                return Err(EmbeddingError::InvalidData(format!(
                    "duplicate word in vocabulary: {}",
                    word
                )));
            }
        }

        Ok(Self {
            words,
            values,
            index,
            dim,
        })
    }

    /// Number of words in the vocabulary
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the vocabulary is empty (never, post-construction)
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Dimensionality of every row
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row number for a word, if present
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Exact membership check
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Word at a row number
    pub fn word(&self, row: usize) -> &str {
        &self.words[row]
    }

    /// The full vocabulary in row order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Embedding row slice
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.dim;
        &self.values[start..start + self.dim]
    }

    /// Scale every row to unit length.
    ///
    /// Called by the store before the table is shared, when the
    /// normalization policy is enabled. Zero rows are left unchanged.
    pub(crate) fn normalize_rows(&mut self) {
        for row in 0..self.words.len() {
            let start = row * self.dim;
            normalize_in_place(&mut self.values[start..start + self.dim]);
        }
    }
}
