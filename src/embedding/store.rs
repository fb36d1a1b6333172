//! Embedding Store
//!
//! Query engine over an immutable embedding table: membership checks,
//! nearest neighbors, and semantic-axis projections with direction caching.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{EmbeddingError, Result};

use super::scan;
use super::similarity::{dot_product, normalize_in_place};
use super::table::EmbeddingTable;

/// A semantic axis: the two pole words a bias direction runs between.
///
/// Order matters: the direction points from `left` toward `right`, and
/// swapping the poles negates every projection along the axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Axis {
    pub left: String,
    pub right: String,
}

impl Axis {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// A word with its projection value along some axis
#[derive(Debug, Clone, PartialEq)]
pub struct WordProjection {
    pub word: String,
    pub projection: f32,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Scale every row to unit length at load time. On, dot-product
    /// ranking is exact cosine similarity and a word is always its own
    /// nearest neighbor. Off preserves raw-magnitude ranking, which
    /// biases toward long vectors.
    pub normalize_on_load: bool,

    /// Number of scan worker threads (0 = auto-detect)
    pub scan_workers: usize,

    /// Minimum vocabulary size before nearest-neighbor scans go parallel
    pub parallel_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            normalize_on_load: true,
            scan_workers: 0,
            parallel_threshold: 32_768,
        }
    }
}

impl StoreConfig {
    pub fn with_normalize_on_load(mut self, normalize: bool) -> Self {
        self.normalize_on_load = normalize;
        self
    }

    pub fn with_scan_workers(mut self, workers: usize) -> Self {
        self.scan_workers = workers;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// Embedding query engine.
///
/// Owns the read-only embedding table and a lazily populated cache of
/// bias directions. Cloning is cheap and clones share both. All queries
/// fail with typed errors on unknown words instead of propagating NaNs.
#[derive(Clone)]
pub struct EmbeddingStore {
    /// Read-only after construction
    table: Arc<EmbeddingTable>,
    /// Ordered pole pair -> unit direction. Append-only, no eviction;
    /// racing writers recompute the same pure value.
    directions: Arc<DashMap<(String, String), Arc<Vec<f32>>>>,
    /// Number of direction computations actually performed
    computations: Arc<AtomicU64>,
    config: StoreConfig,
}

impl EmbeddingStore {
    /// Create a store over a table, applying the normalization policy
    pub fn new(mut table: EmbeddingTable, config: StoreConfig) -> Self {
        if config.normalize_on_load {
            table.normalize_rows();
        }
        Self {
            table: Arc::new(table),
            directions: Arc::new(DashMap::new()),
            computations: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(table: EmbeddingTable) -> Self {
        Self::new(table, StoreConfig::default())
    }

    /// Number of words in the vocabulary
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when the vocabulary is empty (never, post-construction)
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Dimensionality of every embedding
    pub fn dim(&self) -> usize {
        self.table.dim()
    }

    /// The vocabulary in row order
    pub fn words(&self) -> &[String] {
        self.table.words()
    }

    /// Get configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Exact membership check. Never fails.
    pub fn has_word(&self, word: &str) -> bool {
        self.table.contains(word)
    }

    /// Embedding vector for a word
    pub fn vector(&self, word: &str) -> Result<&[f32]> {
        let row = self.row_of(word)?;
        Ok(self.table.row(row))
    }

    /// The `k` most similar words, most similar first.
    ///
    /// Similarity is the dot product of embedding rows; with
    /// `normalize_on_load` this is cosine similarity. The query word
    /// itself is included, anchoring it among its neighbors. `k` is
    /// clamped to the vocabulary size; ties preserve vocabulary order.
    pub fn nearest(&self, word: &str, k: usize) -> Result<Vec<String>> {
        if k == 0 {
            return Err(EmbeddingError::InvalidArgument(
                "neighbor count must be positive".to_string(),
            ));
        }
        let row = self.row_of(word)?;
        let k = k.min(self.table.len());

        let top = scan::top_k(
            &self.table,
            self.table.row(row),
            k,
            self.config.scan_workers,
            self.config.parallel_threshold,
        );
        Ok(top
            .into_iter()
            .map(|(row, _)| self.table.word(row).to_string())
            .collect())
    }

    /// Projection of a word onto the `axis_left` -> `axis_right` bias
    /// direction.
    ///
    /// The direction is computed once per ordered pole pair and cached
    /// for the store lifetime. With unit-normalized rows the result lies
    /// in [-1, 1].
    pub fn project(&self, word: &str, axis_left: &str, axis_right: &str) -> Result<f32> {
        let row = self.row_of(word)?;
        let direction = self.direction(axis_left, axis_right)?;
        Ok(dot_product(self.table.row(row), &direction))
    }

    /// Neighbors of a word ranked by their projection along an axis.
    ///
    /// Composes `nearest` and `project`; the result is sorted ascending
    /// by projection value (the pole order the visualization reads
    /// left-to-right), ties keeping the similarity ranking.
    pub fn project_nearest(
        &self,
        word: &str,
        axis_left: &str,
        axis_right: &str,
        k: usize,
    ) -> Result<Vec<WordProjection>> {
        let neighbors = self.nearest(word, k)?;

        let mut projected = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let projection = self.project(&neighbor, axis_left, axis_right)?;
            projected.push(WordProjection {
                word: neighbor,
                projection,
            });
        }
        projected.sort_by(|a, b| {
            a.projection
                .partial_cmp(&b.projection)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(projected)
    }

    /// Projections of the whole vocabulary onto a set of axes.
    ///
    /// Returns one `Vec` per axis, in vocabulary row order. This is the
    /// precalculation pass behind the background word field.
    pub fn project_all(&self, axes: &[Axis]) -> Result<Vec<Vec<f32>>> {
        let mut per_axis = Vec::with_capacity(axes.len());
        for axis in axes {
            let direction = self.direction(&axis.left, &axis.right)?;
            let projections = (0..self.table.len())
                .map(|row| dot_product(self.table.row(row), &direction))
                .collect();
            per_axis.push(projections);
        }
        Ok(per_axis)
    }

    /// Mean projection of the whole vocabulary onto each axis.
    ///
    /// The renderer subtracts these norms to re-center the falling words
    /// around the axis line.
    pub fn axis_norms(&self, axes: &[Axis]) -> Result<Vec<f32>> {
        let per_axis = self.project_all(axes)?;
        Ok(per_axis
            .into_iter()
            .map(|projections| {
                projections.iter().sum::<f32>() / projections.len() as f32
            })
            .collect())
    }

    /// Number of bias directions computed so far. Repeated queries
    /// against a cached axis pair do not increase this.
    pub fn direction_computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    /// Cached unit direction for an ordered pole pair, computing and
    /// caching it on first use. Concurrent first uses may both compute;
    /// the value is a pure function of the poles, so either write wins.
    fn direction(&self, axis_left: &str, axis_right: &str) -> Result<Arc<Vec<f32>>> {
        if axis_left == axis_right {
            return Err(EmbeddingError::InvalidArgument(format!(
                "degenerate axis: {} / {}",
                axis_left, axis_right
            )));
        }

        let key = (axis_left.to_string(), axis_right.to_string());
        if let Some(cached) = self.directions.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        let left = self.table.row(self.row_of(axis_left)?);
        let right = self.table.row(self.row_of(axis_right)?);
        let mut direction: Vec<f32> = right
            .iter()
            .zip(left.iter())
            .map(|(r, l)| r - l)
            .collect();
        if direction.iter().all(|&d| d == 0.0) {
            return Err(EmbeddingError::InvalidArgument(format!(
                "degenerate axis: {} and {} share an embedding",
                axis_left, axis_right
            )));
        }
        normalize_in_place(&mut direction);
        self.computations.fetch_add(1, Ordering::Relaxed);

        let direction = Arc::new(direction);
        self.directions.insert(key, Arc::clone(&direction));
        Ok(direction)
    }

    fn row_of(&self, word: &str) -> Result<usize> {
        self.table
            .index_of(word)
            .ok_or_else(|| EmbeddingError::UnknownWord {
                word: word.to_string(),
            })
    }
}
