//! OpenAI-compatible embeddings client.
//!
//! Inputs go to `{base_url}/embeddings` in batches of `batch_size`, asking
//! for `dimensions` when configured. Each batch's `data` is re-ordered by
//! `index` before being appended, so the output lines up with the input.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::embeddings::{CreateEmbeddingRequest, EmbeddingInput};
use secrecy::SecretString;

use interlude_core::memory::Embedder;
use interlude_types::config::EmbeddingConfig;
use interlude_types::error::MemoryError;

use crate::llm::openai_compat::{map_openai_error, openai_config};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client for any OpenAI-compatible `/embeddings` endpoint.
///
/// Does not derive Debug: the client holds the API key.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: Option<u32>,
    batch_size: usize,
    /// Configured dimension, or the one observed in the first response.
    observed_dimension: AtomicUsize,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, MemoryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MemoryError::Embedding(format!("failed to create HTTP client: {e}")))?;

        let api_key = config
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .map(|k| SecretString::from(k.clone()));
        let client = Client::with_config(openai_config(&config.base_url, api_key.as_ref()))
            .with_http_client(http);

        Ok(Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
            observed_dimension: AtomicUsize::new(config.dimensions.unwrap_or(0) as usize),
        })
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::StringArray(batch.to_vec()),
            dimensions: self.dimensions,
            ..Default::default()
        };

        let mut response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| MemoryError::Embedding(map_openai_error(e).to_string()))?;

        if response.data.len() != batch.len() {
            return Err(MemoryError::Embedding(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                response.data.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }

        if let Some(first) = vectors.first() {
            let expected = self.observed_dimension.load(Ordering::Relaxed);
            if expected != 0 && first.len() != expected {
                return Err(MemoryError::DimensionMismatch {
                    expected,
                    actual: first.len(),
                });
            }
            self.observed_dimension.store(first.len(), Ordering::Relaxed);
        }

        tracing::debug!(model = %self.model, count = vectors.len(), "embedded texts");
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.observed_dimension.load(Ordering::Relaxed)
    }
}
