//! Embedding Module
//!
//! Embedding table storage, similarity math, and the query engine.

mod scan;
mod similarity;
mod store;
mod table;

pub use similarity::{cosine_similarity, dot_product, magnitude, normalized};
pub use store::{Axis, EmbeddingStore, StoreConfig, WordProjection};
pub use table::EmbeddingTable;
