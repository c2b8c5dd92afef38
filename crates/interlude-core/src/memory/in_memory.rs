//! Bounded in-process agent memory.
//!
//! Items live in insertion order; once `max_items` is reached the oldest
//! item is evicted for each new one. Search is a linear cosine-similarity
//! scan, which is fine at the sizes this store is bounded to.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use interlude_types::agent::{MemoryItem, RankedMemory};
use interlude_types::error::MemoryError;

use super::agent_memory::{AgentMemory, MemoryQuery};
use super::box_embedder::BoxEmbedder;

struct StoredItem {
    item: MemoryItem,
    embedding: Vec<f32>,
}

pub struct InMemoryAgentMemory {
    embedder: Arc<BoxEmbedder>,
    max_items: usize,
    items: RwLock<VecDeque<StoredItem>>,
}

impl InMemoryAgentMemory {
    pub fn new(embedder: Arc<BoxEmbedder>, max_items: usize) -> Self {
        Self {
            embedder,
            max_items: max_items.max(1),
            items: RwLock::new(VecDeque::new()),
        }
    }

    pub fn embedder(&self) -> &BoxEmbedder {
        &self.embedder
    }
}

impl AgentMemory for InMemoryAgentMemory {
    async fn save(&self, item: MemoryItem) -> Result<(), MemoryError> {
        let embedding = self.embedder.embed_query(&item.content).await?;

        let mut items = self.items.write().await;
        if let Some(first) = items.front()
            && first.embedding.len() != embedding.len()
        {
            return Err(MemoryError::DimensionMismatch {
                expected: first.embedding.len(),
                actual: embedding.len(),
            });
        }
        while items.len() >= self.max_items {
            if let Some(evicted) = items.pop_front() {
                tracing::debug!(id = %evicted.item.id, "memory full, evicted oldest item");
            }
        }
        tracing::debug!(id = %item.id, kind = %item.kind, "memory item saved");
        items.push_back(StoredItem { item, embedding });
        Ok(())
    }

    async fn search(&self, query: &MemoryQuery) -> Result<Vec<RankedMemory>, MemoryError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let needle = self.embedder.embed_query(&query.text).await?;

        let items = self.items.read().await;
        let mut scored: Vec<(f32, &MemoryItem)> = items
            .iter()
            .filter(|s| query.kind.is_none_or(|k| s.item.kind == k))
            .map(|s| (cosine_similarity(&needle, &s.embedding), &s.item))
            .filter(|(sim, _)| *sim >= query.min_similarity)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(query.limit)
            .enumerate()
            .map(|(i, (similarity, item))| RankedMemory {
                item: item.clone(),
                similarity,
                rank: i + 1,
            })
            .collect())
    }

    async fn recent(&self, limit: usize) -> Vec<MemoryItem> {
        let items = self.items.read().await;
        items.iter().rev().take(limit).map(|s| s.item.clone()).collect()
    }

    async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    fn max_items(&self) -> usize {
        self.max_items
    }
}

/// Cosine similarity; zero when either vector is all zeros or the lengths
/// differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}
