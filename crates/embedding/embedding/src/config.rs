//! Embedding configuration: provider type, trait and env-based implementation.

use anyhow::Result;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Model used when `EMBEDDING_MODEL` is not set.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Supported embedding providers. Matches .env `EMBEDDING_PROVIDER`: fastembed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderType {
    /// Local ONNX models through fastembed.
    FastEmbed,
}

impl FromStr for EmbeddingProviderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("fastembed") {
            Ok(Self::FastEmbed)
        } else {
            anyhow::bail!("Unsupported embedding provider: {}", s)
        }
    }
}

impl fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastEmbed => f.write_str("fastembed"),
        }
    }
}

/// Embedding provider configuration interface.
pub trait EmbeddingConfig: Send + Sync {
    /// Raw provider name, e.g. "fastembed". Parse with [`EmbeddingProviderType::from_str`].
    fn provider(&self) -> &str;
    /// Model identifier, e.g. "sentence-transformers/all-MiniLM-L6-v2".
    fn model_name(&self) -> &str;
    /// Directory for downloaded model files (FASTEMBED_CACHE_PATH). None = runtime default.
    fn cache_dir(&self) -> Option<&Path>;
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub embedding_provider: String,
    pub embedding_model: String,
    pub cache_dir: Option<PathBuf>,
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn provider(&self) -> &str {
        &self.embedding_provider
    }
    fn model_name(&self) -> &str {
        &self.embedding_model
    }
    fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let embedding_provider =
            env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "fastembed".to_string());
        let embedding_model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        let cache_dir = env::var("FASTEMBED_CACHE_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            embedding_provider,
            embedding_model,
            cache_dir,
        })
    }

    /// Overrides the model (e.g. from a CLI flag).
    pub fn with_model(mut self, model: String) -> Self {
        self.embedding_model = model;
        self
    }

    /// Parsed provider type.
    pub fn provider_type(&self) -> Result<EmbeddingProviderType> {
        self.embedding_provider.parse()
    }

    /// Validate config (known provider, non-empty model).
    pub fn validate(&self) -> Result<()> {
        self.provider_type()?;
        if self.embedding_model.trim().is_empty() {
            anyhow::bail!("EMBEDDING_MODEL must not be empty");
        }
        Ok(())
    }
}
