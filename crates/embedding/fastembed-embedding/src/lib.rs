//! # FastEmbed Embedding Provider
//!
//! This crate provides an implementation of the `EmbeddingProvider` trait on top of a local,
//! synchronous embedding model (fastembed / ONNX Runtime).
//!
//! ## FastEmbedProvider
//!
//! - The model is loaded lazily on first use, at most once, and reused for the provider's lifetime.
//! - Inference is blocking, so every embed call runs on tokio's blocking pool and is awaited.
//! - Documents go through the runtime's passage path, queries through its query path.
//! - The vector name is `fast-<model>`, where `<model>` is the lowercased last path segment of the
//!   resolved model name. Existing collections rely on this exact format.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fastembed_embedding::FastEmbedProvider;
//! use embedding::EmbeddingProvider;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let provider = FastEmbedProvider::new("sentence-transformers/all-MiniLM-L6-v2");
//!
//!     let vectors = provider.embed_documents(&["Hello world".to_string()]).await?;
//!     let query = provider.embed_query("greeting").await?;
//!     println!("{}: {} docs, dim {}", provider.vector_name()?, vectors.len(), query.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`create_embedding_provider`] for building a provider from [`embedding::EmbeddingConfig`]
//! (`EMBEDDING_PROVIDER`, `EMBEDDING_MODEL`, `FASTEMBED_CACHE_PATH`).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use embedding::EmbeddingProvider;
use once_cell::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

mod factory;
mod runtime;

pub use factory::create_embedding_provider;
pub use runtime::{resolve_model, EmbeddingRuntime, FastEmbedRuntime};

/// Prefix of every vector name produced by this provider.
pub const VECTOR_NAME_PREFIX: &str = "fast-";

type RuntimeLoader<R> = Box<dyn Fn(&str) -> Result<R> + Send + Sync>;

/// Lazily-loaded runtime shared with blocking tasks.
struct Shared<R> {
    model_name: String,
    loader: RuntimeLoader<R>,
    runtime: OnceCell<R>,
}

impl<R: EmbeddingRuntime> Shared<R> {
    /// Returns the runtime, loading it on first call. Concurrent first callers wait for a single
    /// load; a failed load leaves the cell empty so the next call retries.
    fn runtime(&self) -> Result<&R> {
        if let Some(runtime) = self.runtime.get() {
            debug!(model = %self.model_name, "embedding runtime reused");
            return Ok(runtime);
        }
        self.runtime.get_or_try_init(|| {
            info!(model = %self.model_name, "step: embedding runtime init");
            (self.loader)(&self.model_name).map_err(|e| {
                warn!(model = %self.model_name, error = %e, "embedding runtime init failed");
                e
            })
        })
    }
}

/// Embedding provider over a lazily-loaded [`EmbeddingRuntime`].
pub struct FastEmbedProvider<R = FastEmbedRuntime> {
    shared: Arc<Shared<R>>,
}

impl FastEmbedProvider<FastEmbedRuntime> {
    /// Creates a provider for `model_name`. Nothing is loaded until the first call.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self::with_cache_dir(model_name, None)
    }

    /// Like [`FastEmbedProvider::new`], storing model files under `cache_dir` when set.
    pub fn with_cache_dir(model_name: impl Into<String>, cache_dir: Option<PathBuf>) -> Self {
        Self::with_loader(model_name, move |name: &str| {
            FastEmbedRuntime::load(name, cache_dir.clone())
        })
    }
}

impl<R: EmbeddingRuntime> FastEmbedProvider<R> {
    /// Creates a provider whose runtime is built by `loader` on first use.
    pub fn with_loader<F>(model_name: impl Into<String>, loader: F) -> Self
    where
        F: Fn(&str) -> Result<R> + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                model_name: model_name.into(),
                loader: Box::new(loader),
                runtime: OnceCell::new(),
            }),
        }
    }

    /// Model identifier as supplied at construction.
    pub fn model_name(&self) -> &str {
        &self.shared.model_name
    }

    /// True once the runtime has been loaded. Never goes back to false.
    pub fn is_ready(&self) -> bool {
        self.shared.runtime.get().is_some()
    }

    /// Loads the runtime if needed and runs `f` on it in the blocking pool.
    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&R) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || f(shared.runtime()?))
            .await
            .context("embedding task failed")?
    }
}

impl<R> fmt::Debug for FastEmbedProvider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_name", &self.shared.model_name)
            .field("ready", &self.shared.runtime.get().is_some())
            .finish()
    }
}

/// Vector field name for a resolved model name: `"org/Model-ABC"` becomes `"fast-model-abc"`.
pub fn vector_name_for_model(model_name: &str) -> String {
    format!(
        "{}{}",
        VECTOR_NAME_PREFIX,
        runtime::last_segment(model_name).to_lowercase()
    )
}

#[async_trait]
impl<R: EmbeddingRuntime> EmbeddingProvider for FastEmbedProvider<R> {
    /// Embeds documents through the runtime's passage path.
    ///
    /// # Errors
    ///
    /// Returns the runtime's error unchanged if the model cannot be loaded or inference fails.
    /// No partial results are returned.
    #[instrument(skip(self, documents), fields(model = %self.shared.model_name, batch_size = documents.len()))]
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        info!("step: embedding FastEmbed embed_documents request");

        let documents = documents.to_vec();
        let embeddings = match self
            .run_blocking(move |runtime| runtime.embed_passages(documents))
            .await
        {
            Ok(embeddings) => embeddings,
            Err(e) => {
                warn!(error = %e, "FastEmbed embed_documents failed");
                return Err(e);
            }
        };

        let dimension = embeddings.first().map(|v| v.len()).unwrap_or(0);
        info!(
            count = embeddings.len(),
            dimension = dimension,
            "step: embedding FastEmbed embed_documents done"
        );
        Ok(embeddings)
    }

    /// Embeds one query through the runtime's query path as a single-item batch.
    #[instrument(skip(self, query), fields(model = %self.shared.model_name, query_len = query.len()))]
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, anyhow::Error> {
        info!("step: embedding FastEmbed embed_query request");

        let queries = vec![query.to_string()];
        let embeddings = match self
            .run_blocking(move |runtime| runtime.embed_queries(queries))
            .await
        {
            Ok(embeddings) => embeddings,
            Err(e) => {
                warn!(error = %e, "FastEmbed embed_query failed");
                return Err(e);
            }
        };

        let embedding = match embeddings.into_iter().next() {
            Some(embedding) => embedding,
            None => {
                warn!("FastEmbed embed_query returned no vector");
                return Err(anyhow::anyhow!("empty embedding result"));
            }
        };

        info!(
            dimension = embedding.len(),
            "step: embedding FastEmbed embed_query done"
        );
        Ok(embedding)
    }

    fn vector_name(&self) -> Result<String, anyhow::Error> {
        let runtime = self.shared.runtime()?;
        Ok(vector_name_for_model(runtime.model_name()))
    }

    fn vector_size(&self) -> Result<usize, anyhow::Error> {
        Ok(self.shared.runtime()?.dim())
    }
}
