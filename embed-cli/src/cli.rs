//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};
use embedding::{EmbeddingProvider, EnvEmbeddingConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "embed")]
#[command(about = "Embed documents and queries with a local model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Model identifier; overrides EMBEDDING_MODEL.
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed one or more documents and print the vectors as JSON.
    Documents {
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Embed a search query and print the vector as JSON.
    Query { text: String },
    /// Print the collection vector name and size for the model.
    VectorName,
}

/// Load embedding config from environment. If `model` is provided it overrides EMBEDDING_MODEL.
pub fn load_config(model: Option<String>) -> Result<EnvEmbeddingConfig> {
    let mut config = EnvEmbeddingConfig::from_env()?;
    if let Some(model) = model {
        config = config.with_model(model);
    }
    config.validate()?;
    Ok(config)
}

/// Runs `command` against `provider` and returns the text to print on stdout.
///
/// Vectors are rendered as JSON; `vector-name` prints `<name>\t<size>`.
pub async fn execute(command: Commands, provider: &dyn EmbeddingProvider) -> Result<String> {
    let result = match command {
        Commands::Documents { texts } => {
            info!(count = texts.len(), "step: embed documents");
            let embeddings = provider.embed_documents(&texts).await;
            embeddings.and_then(|e| Ok(serde_json::to_string(&e)?))
        }
        Commands::Query { text } => {
            info!(query_len = text.len(), "step: embed query");
            let embedding = provider.embed_query(&text).await;
            embedding.and_then(|e| Ok(serde_json::to_string(&e)?))
        }
        Commands::VectorName => {
            info!("step: resolve vector name");
            provider
                .vector_name()
                .and_then(|name| Ok(format!("{}\t{}", name, provider.vector_size()?)))
        }
    };
    if let Err(e) = &result {
        warn!(error = %e, "embed command failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use embedding::EmbeddingConfig;
    use serial_test::serial;

    /// Encodes each text as `[len]`; queries as `[len, 1.0]`.
    struct LengthProvider;

    #[async_trait]
    impl EmbeddingProvider for LengthProvider {
        async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(documents.iter().map(|d| vec![d.len() as f32]).collect())
        }

        async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
            Ok(vec![query.len() as f32, 1.0])
        }

        fn vector_name(&self) -> Result<String> {
            Ok("fast-length".to_string())
        }

        fn vector_size(&self) -> Result<usize> {
            Ok(1)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        async fn embed_documents(&self, _documents: &[String]) -> Result<Vec<Vec<f32>>> {
            anyhow::bail!("Unsupported embedding model: no-such/model")
        }

        async fn embed_query(&self, _query: &str) -> Result<Vec<f32>> {
            anyhow::bail!("Unsupported embedding model: no-such/model")
        }

        fn vector_name(&self) -> Result<String> {
            anyhow::bail!("Unsupported embedding model: no-such/model")
        }

        fn vector_size(&self) -> Result<usize> {
            anyhow::bail!("Unsupported embedding model: no-such/model")
        }
    }

    #[tokio::test]
    async fn test_execute_documents_prints_json() {
        let command = Commands::Documents {
            texts: vec!["ab".to_string(), "abcd".to_string()],
        };
        let output = execute(command, &LengthProvider).await.unwrap();
        assert_eq!(output, "[[2.0],[4.0]]");
    }

    #[tokio::test]
    async fn test_execute_query_prints_json() {
        let command = Commands::Query {
            text: "abc".to_string(),
        };
        let output = execute(command, &LengthProvider).await.unwrap();
        assert_eq!(output, "[3.0,1.0]");
    }

    #[tokio::test]
    async fn test_execute_vector_name() {
        let output = execute(Commands::VectorName, &LengthProvider).await.unwrap();
        assert_eq!(output, "fast-length\t1");
    }

    #[tokio::test]
    async fn test_execute_propagates_provider_error() {
        let err = execute(Commands::VectorName, &FailingProvider)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported embedding model: no-such/model");
    }

    #[test]
    fn test_parse_documents() {
        let cli = Cli::parse_from(["embed", "documents", "first", "second"]);
        assert!(cli.model.is_none());
        match cli.command {
            Commands::Documents { texts } => assert_eq!(texts, vec!["first", "second"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_with_model() {
        let cli = Cli::parse_from(["embed", "query", "what is rust?", "--model", "BAAI/bge-small-en-v1.5"]);
        assert_eq!(cli.model.as_deref(), Some("BAAI/bge-small-en-v1.5"));
        match cli.command {
            Commands::Query { text } => assert_eq!(text, "what is rust?"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_documents_requires_text() {
        assert!(Cli::try_parse_from(["embed", "documents"]).is_err());
    }

    #[test]
    #[serial]
    fn test_load_config_model_override() {
        std::env::set_var("EMBEDDING_PROVIDER", "openai");
        std::env::set_var("EMBEDDING_MODEL", "BAAI/bge-small-en-v1.5");
        assert!(load_config(None).is_err());

        std::env::remove_var("EMBEDDING_PROVIDER");
        let config = load_config(Some("SimpleModel".to_string())).unwrap();
        std::env::remove_var("EMBEDDING_MODEL");

        assert_eq!(config.provider(), "fastembed");
        assert_eq!(config.model_name(), "SimpleModel");
    }
}
