//! # Text Embeddings
//!
//! This crate defines the embedding provider interface used to turn documents and queries
//! into vectors, plus the env-based configuration that selects and parameterizes a provider.
//!
//! A provider also names the vector field its vectors live under in a vector-database
//! collection (see [`EmbeddingProvider::vector_name`]), so several models can share a collection.

use async_trait::async_trait;

mod config;
pub use config::{
    EmbeddingConfig, EmbeddingProviderType, EnvEmbeddingConfig, DEFAULT_EMBEDDING_MODEL,
};

/// Provider of document and query embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of documents (passages). Output position `i` belongs to `documents[i]`.
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;

    /// Embeds a single search query.
    ///
    /// Query and document embeddings may differ for the same text; callers must not assume
    /// `embed_query(q) == embed_documents([q])[0]`.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Name of the vector field for this provider's vectors in a collection.
    fn vector_name(&self) -> Result<String, anyhow::Error>;

    /// Dimensionality of the vectors this provider returns.
    fn vector_size(&self) -> Result<usize, anyhow::Error>;
}
