//! AgentMemory trait and its object-safe wrapper.
//!
//! Agent memory holds text notes and known-good tool usages, searchable by
//! semantic similarity. The memory tools read and write through this trait.

use std::future::Future;
use std::pin::Pin;

use interlude_types::agent::{MemoryItem, MemoryKind, RankedMemory};
use interlude_types::error::MemoryError;

/// Parameters of a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryQuery {
    pub text: String,
    /// Restrict results to one kind of item.
    pub kind: Option<MemoryKind>,
    pub limit: usize,
    /// Drop results below this cosine similarity.
    pub min_similarity: f32,
}

impl MemoryQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: None,
            limit: 10,
            min_similarity: 0.0,
        }
    }

    pub fn kind(mut self, kind: MemoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }
}

pub trait AgentMemory: Send + Sync {
    /// Embed and store an item, evicting the oldest when full.
    fn save(&self, item: MemoryItem) -> impl Future<Output = Result<(), MemoryError>> + Send;

    /// Most similar items first.
    fn search(
        &self,
        query: &MemoryQuery,
    ) -> impl Future<Output = Result<Vec<RankedMemory>, MemoryError>> + Send;

    /// Newest items first.
    fn recent(&self, limit: usize) -> impl Future<Output = Vec<MemoryItem>> + Send;

    fn len(&self) -> impl Future<Output = usize> + Send;

    /// Capacity bound.
    fn max_items(&self) -> usize;
}

/// Object-safe version of [`AgentMemory`] with boxed futures.
pub trait AgentMemoryDyn: Send + Sync {
    fn save_boxed<'a>(
        &'a self,
        item: MemoryItem,
    ) -> Pin<Box<dyn Future<Output = Result<(), MemoryError>> + Send + 'a>>;

    fn search_boxed<'a>(
        &'a self,
        query: &'a MemoryQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RankedMemory>, MemoryError>> + Send + 'a>>;

    fn recent_boxed(&self, limit: usize) -> Pin<Box<dyn Future<Output = Vec<MemoryItem>> + Send + '_>>;

    fn len_boxed(&self) -> Pin<Box<dyn Future<Output = usize> + Send + '_>>;

    fn max_items_dyn(&self) -> usize;
}

impl<T: AgentMemory> AgentMemoryDyn for T {
    fn save_boxed<'a>(
        &'a self,
        item: MemoryItem,
    ) -> Pin<Box<dyn Future<Output = Result<(), MemoryError>> + Send + 'a>> {
        Box::pin(self.save(item))
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a MemoryQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RankedMemory>, MemoryError>> + Send + 'a>> {
        Box::pin(self.search(query))
    }

    fn recent_boxed(&self, limit: usize) -> Pin<Box<dyn Future<Output = Vec<MemoryItem>> + Send + '_>> {
        Box::pin(self.recent(limit))
    }

    fn len_boxed(&self) -> Pin<Box<dyn Future<Output = usize> + Send + '_>> {
        Box::pin(self.len())
    }

    fn max_items_dyn(&self) -> usize {
        self.max_items()
    }
}

/// Type-erased agent memory.
pub struct BoxAgentMemory {
    inner: Box<dyn AgentMemoryDyn + Send + Sync>,
}

impl BoxAgentMemory {
    pub fn new<T: AgentMemory + 'static>(memory: T) -> Self {
        Self {
            inner: Box::new(memory),
        }
    }

    pub async fn save(&self, item: MemoryItem) -> Result<(), MemoryError> {
        self.inner.save_boxed(item).await
    }

    pub async fn search(&self, query: &MemoryQuery) -> Result<Vec<RankedMemory>, MemoryError> {
        self.inner.search_boxed(query).await
    }

    pub async fn recent(&self, limit: usize) -> Vec<MemoryItem> {
        self.inner.recent_boxed(limit).await
    }

    pub async fn len(&self) -> usize {
        self.inner.len_boxed().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn max_items(&self) -> usize {
        self.inner.max_items_dyn()
    }
}
