//! Embedding Loaders
//!
//! Materializes the `(words, values)` pair the embedding table is built
//! from, out of the two on-disk formats the visualization data ships in:
//! word2vec text, and a words manifest next to a flat binary value buffer.
//!
//! Cleaning lives here, not in the core: words are lowercased, underscores
//! become spaces, and rows whose cleaned word repeats are dropped
//! (first occurrence wins).

use std::fs;
use std::io;
use std::path::Path;

use bytes::{Buf, Bytes};
use hashbrown::HashSet;
use tracing::debug;

/// A vocabulary and its matching flat value buffer, ready for
/// `EmbeddingTable::new`.
#[derive(Debug, Clone)]
pub struct LoadedEmbeddings {
    pub words: Vec<String>,
    pub values: Vec<f32>,
}

impl LoadedEmbeddings {
    /// Row dimensionality, 0 for an empty load
    pub fn dim(&self) -> usize {
        if self.words.is_empty() {
            0
        } else {
            self.values.len() / self.words.len()
        }
    }
}

/// Normalize a raw word the way the visualization displays it:
/// lowercased, underscores as spaces.
pub fn clean_word(raw: &str) -> String {
    raw.replace('_', " ").to_lowercase()
}

/// Load word2vec text format: one `word v1 v2 ... vD` row per line.
///
/// Dimensionality is set by the first row; ragged rows are rejected.
pub fn load_word2vec_text<P: AsRef<Path>>(path: P) -> io::Result<LoadedEmbeddings> {
    let text = fs::read_to_string(path)?;

    let mut words = Vec::new();
    let mut values = Vec::new();
    let mut dim = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let word = tokens
            .next()
            .ok_or_else(|| data_err(format!("line {}: missing word", line_no + 1)))?;

        let mut row = Vec::new();
        for token in tokens {
            let value: f32 = token.parse().map_err(|_| {
                data_err(format!("line {}: bad float {:?}", line_no + 1, token))
            })?;
            row.push(value);
        }
        if row.is_empty() {
            return Err(data_err(format!("line {}: no vector components", line_no + 1)));
        }
        if dim == 0 {
            dim = row.len();
        } else if row.len() != dim {
            return Err(data_err(format!(
                "line {}: expected {} components, got {}",
                line_no + 1,
                dim,
                row.len()
            )));
        }

        words.push(word.to_string());
        values.extend(row);
    }

    Ok(clean_rows(words, values, dim))
}

/// Load the split download format: a words manifest (JSON string array or
/// one word per line) and a little-endian `f32` binary buffer.
pub fn load_split<P: AsRef<Path>>(
    words_path: P,
    values_path: P,
) -> io::Result<LoadedEmbeddings> {
    let manifest = fs::read_to_string(words_path)?;
    let words: Vec<String> = if manifest.trim_start().starts_with('[') {
        serde_json::from_str(&manifest)
            .map_err(|e| data_err(format!("bad words manifest: {}", e)))?
    } else {
        manifest
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    };
    if words.is_empty() {
        return Err(data_err("words manifest is empty".to_string()));
    }

    let raw = fs::read(values_path)?;
    if raw.is_empty() || raw.len() % 4 != 0 {
        return Err(data_err(format!(
            "value buffer length {} is not a whole number of f32s",
            raw.len()
        )));
    }
    let mut buf = Bytes::from(raw);
    let mut values = Vec::with_capacity(buf.len() / 4);
    while buf.has_remaining() {
        values.push(buf.get_f32_le());
    }

    if values.len() % words.len() != 0 {
        return Err(data_err(format!(
            "{} values do not evenly cover {} words",
            values.len(),
            words.len()
        )));
    }
    let dim = values.len() / words.len();

    Ok(clean_rows(words, values, dim))
}

/// Clean every word and drop rows whose cleaned word was already seen
fn clean_rows(words: Vec<String>, values: Vec<f32>, dim: usize) -> LoadedEmbeddings {
    let mut seen = HashSet::with_capacity(words.len());
    let mut kept_words = Vec::with_capacity(words.len());
    let mut kept_values = Vec::with_capacity(values.len());

    for (row, raw) in words.iter().enumerate() {
        let word = clean_word(raw);
        if !seen.insert(word.clone()) {
            debug!(word = %word, "dropping duplicate row");
            continue;
        }
        kept_words.push(word);
        kept_values.extend_from_slice(&values[row * dim..(row + 1) * dim]);
    }

    LoadedEmbeddings {
        words: kept_words,
        values: kept_values,
    }
}

fn data_err(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_word2vec_text() {
        let file = temp_file(b"he 1.0 0.0\nshe -1.0 0.0\n");
        let loaded = load_word2vec_text(file.path()).unwrap();
        assert_eq!(loaded.words, vec!["he", "she"]);
        assert_eq!(loaded.values, vec![1.0, 0.0, -1.0, 0.0]);
        assert_eq!(loaded.dim(), 2);
    }

    #[test]
    fn test_word2vec_cleans_and_dedups() {
        let file = temp_file(b"New_York 0.5 0.5\nnew_york 1.0 1.0\nparis 0.0 1.0\n");
        let loaded = load_word2vec_text(file.path()).unwrap();
        assert_eq!(loaded.words, vec!["new york", "paris"]);
        assert_eq!(loaded.values, vec![0.5, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_word2vec_ragged_row_rejected() {
        let file = temp_file(b"a 1.0\nb 1.0 2.0\n");
        let err = load_word2vec_text(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_word2vec_bad_float_rejected() {
        let file = temp_file(b"a 1.0 oops\n");
        let err = load_word2vec_text(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    fn values_bin(values: &[f32]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(values.len() * 4);
        for v in values {
            buf.put_f32_le(*v);
        }
        buf
    }

    #[test]
    fn test_split_json_manifest() {
        let words = temp_file(b"[\"He\", \"she\"]");
        let values = temp_file(&values_bin(&[1.0, 0.0, -1.0, 0.0]));
        let loaded = load_split(words.path(), values.path()).unwrap();
        assert_eq!(loaded.words, vec!["he", "she"]);
        assert_eq!(loaded.values, vec![1.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_split_line_manifest() {
        let words = temp_file(b"he\nshe\n");
        let values = temp_file(&values_bin(&[1.0, 0.0, -1.0, 0.0]));
        let loaded = load_split(words.path(), values.path()).unwrap();
        assert_eq!(loaded.words, vec!["he", "she"]);
        assert_eq!(loaded.dim(), 2);
    }

    #[test]
    fn test_split_truncated_buffer_rejected() {
        let words = temp_file(b"he\nshe\n");
        let values = temp_file(&[0u8; 7]);
        let err = load_split(words.path(), values.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_split_uneven_coverage_rejected() {
        let words = temp_file(b"he\nshe\nit\n");
        let values = temp_file(&values_bin(&[1.0, 0.0, -1.0, 0.0]));
        let err = load_split(words.path(), values.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
