// Embeddings module
// Provider client, cosine similarity and keyword extraction

pub mod client;
pub mod keywords;
pub mod similarity;

pub use client::EmbeddingClient;
pub use keywords::extract_keywords;
pub use similarity::cosine_similarity;

use crate::Result;

/// Turns text into a fixed-dimension vector
pub trait Embedder: Send + Sync {
    fn create_embedding(&self, text: &str) -> Result<Vec<f32>>;
}
