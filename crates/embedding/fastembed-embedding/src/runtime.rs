//! Embedding model runtime: the synchronous engine behind [`crate::FastEmbedProvider`].

use std::path::PathBuf;

use anyhow::Result;
use fastembed::{EmbeddingModel, InitOptions, ModelInfo, TextEmbedding};
use tracing::{debug, info};

/// Synchronous text-to-vector engine.
///
/// Calls block the current thread; the provider only invokes them from tokio's blocking pool.
pub trait EmbeddingRuntime: Send + Sync + 'static {
    /// Document ("passage") embeddings, one per input, in input order.
    fn embed_passages(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Query embeddings, one per input, in input order.
    fn embed_queries(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Model name as resolved by the runtime. May be namespaced, e.g. "org/model".
    fn model_name(&self) -> &str;

    /// Vector dimensionality of the loaded model.
    fn dim(&self) -> usize;
}

/// [`EmbeddingRuntime`] backed by a local fastembed ONNX model.
pub struct FastEmbedRuntime {
    model: TextEmbedding,
    model_name: String,
    dim: usize,
}

impl FastEmbedRuntime {
    /// Resolves `model_name` against the fastembed catalog and loads it.
    ///
    /// Downloads model files into `cache_dir` (or fastembed's default) on first use.
    pub fn load(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self> {
        let catalog = TextEmbedding::list_supported_models();
        let (info, resolved) = resolve_model(model_name, &catalog)?;

        info!(
            model = %model_name,
            resolved = %resolved,
            dim = info.dim,
            "step: embedding FastEmbed model load"
        );

        let mut options =
            InitOptions::new(info.model.clone()).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let model = TextEmbedding::try_new(options)?;

        info!(model = %resolved, "step: embedding FastEmbed model loaded");
        Ok(Self {
            model,
            model_name: resolved,
            dim: info.dim,
        })
    }

    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.model.embed(texts, None)
    }
}

impl EmbeddingRuntime for FastEmbedRuntime {
    fn embed_passages(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        debug!(batch_size = texts.len(), "FastEmbed passage embed");
        self.embed(texts)
    }

    fn embed_queries(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        debug!(batch_size = texts.len(), "FastEmbed query embed");
        self.embed(texts)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

/// Finds `requested` in `catalog` and returns the entry with the resolved model name.
///
/// A full model-code match resolves to the catalog's code. Otherwise the last path segment is
/// compared (ignoring a catalog-side `-onnx` suffix) and the requested name is kept as-is, so
/// "sentence-transformers/all-MiniLM-L6-v2" still names the field "fast-all-minilm-l6-v2".
pub fn resolve_model<'a>(
    requested: &str,
    catalog: &'a [ModelInfo<EmbeddingModel>],
) -> Result<(&'a ModelInfo<EmbeddingModel>, String)> {
    let requested = requested.trim();

    if let Some(info) = catalog
        .iter()
        .find(|m| m.model_code.eq_ignore_ascii_case(requested))
    {
        return Ok((info, info.model_code.clone()));
    }

    let wanted = last_segment(requested).to_lowercase();
    catalog
        .iter()
        .find(|m| {
            let code = last_segment(&m.model_code).to_lowercase();
            code == wanted || code.strip_suffix("-onnx") == Some(wanted.as_str())
        })
        .map(|info| {
            debug!(
                requested = %requested,
                catalog = %info.model_code,
                "embedding model matched by name, loading catalog model"
            );
            (info, requested.to_string())
        })
        .ok_or_else(|| anyhow::anyhow!("Unsupported embedding model: {}", requested))
}

pub(crate) fn last_segment(model_name: &str) -> &str {
    model_name.rsplit('/').next().unwrap_or(model_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sentence_transformers_name_is_kept() {
        let catalog = TextEmbedding::list_supported_models();
        let (info, resolved) =
            resolve_model("sentence-transformers/all-MiniLM-L6-v2", &catalog).unwrap();
        assert_eq!(resolved, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(info.dim, 384);
    }

    #[test]
    fn test_resolve_by_segment_keeps_any_namespace() {
        let catalog = TextEmbedding::list_supported_models();
        let (info, resolved) = resolve_model("someone/bge-small-en-v1.5", &catalog).unwrap();
        assert_eq!(resolved, "someone/bge-small-en-v1.5");
        assert!(info
            .model_code
            .to_lowercase()
            .ends_with("/bge-small-en-v1.5"));
        assert_eq!(info.dim, 384);
    }

    #[test]
    fn test_resolve_full_code_uses_catalog_code() {
        let catalog = TextEmbedding::list_supported_models();
        let code = catalog[0].model_code.clone();
        let (_, resolved) = resolve_model(&code.to_uppercase(), &catalog).unwrap();
        assert_eq!(resolved, code);
    }

    #[test]
    fn test_resolve_unknown_model() {
        let catalog = TextEmbedding::list_supported_models();
        let err = resolve_model("no-such/model", &catalog).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported embedding model: no-such/model");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("org/Model-ABC"), "Model-ABC");
        assert_eq!(last_segment("SimpleModel"), "SimpleModel");
        assert_eq!(last_segment("a/b/c"), "c");
    }
}
