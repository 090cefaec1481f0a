//! Builds an [`EmbeddingProvider`] from [`EmbeddingConfig`].

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use embedding::{EmbeddingConfig, EmbeddingProvider, EmbeddingProviderType};
use tracing::info;

use crate::FastEmbedProvider;

/// Creates the provider selected by `config.provider()`. The model is not loaded here.
///
/// # Errors
///
/// Returns an error for an unknown provider name.
pub fn create_embedding_provider(
    config: &dyn EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider_type: EmbeddingProviderType = config.provider().parse()?;
    info!(
        provider = %provider_type,
        model = %config.model_name(),
        "step: embedding provider create"
    );

    let provider: Arc<dyn EmbeddingProvider> = match provider_type {
        EmbeddingProviderType::FastEmbed => Arc::new(FastEmbedProvider::with_cache_dir(
            config.model_name(),
            config.cache_dir().map(Path::to_path_buf),
        )),
    };
    Ok(provider)
}
