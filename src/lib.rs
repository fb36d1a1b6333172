//! WORDFALL - Embedding Query Engine
//!
//! Nearest-neighbor and semantic-axis projection queries over word
//! embeddings, feeding falling-word ("digital rain") bias visualizations.

pub mod embedding;
pub mod error;
pub mod loader;

pub use embedding::{Axis, EmbeddingStore, EmbeddingTable, StoreConfig, WordProjection};
pub use error::{EmbeddingError, Result};
pub use loader::LoadedEmbeddings;
