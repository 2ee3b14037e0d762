//! Store-agnostic access to a container of JSON documents keyed by `id`.
//!
//! Each store decides for itself what "not found" looks like on its wire and
//! reports it as `StoreOutcome::NotFound`; callers never inspect raw status
//! codes or error bodies.

pub mod memory;

pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::fmt;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name of the backing technology, used in logs and health output.
    fn kind(&self) -> &'static str;

    async fn read(&self, id: &str) -> StoreOutcome<JsonValue>;

    async fn read_all(&self) -> Result<Vec<JsonValue>, StoreFailure>;

    /// Inserts or replaces `document`. `Ok(None)` means the store accepted the
    /// write but returned no document.
    async fn upsert(&self, document: JsonValue) -> Result<Option<JsonValue>, StoreFailure>;

    async fn delete(&self, id: &str) -> StoreOutcome<()>;
}

/// Result of a keyed store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOutcome<T> {
    Found(T),
    NotFound,
    Failed(StoreFailure),
}

/// A failure reported by a document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl StoreFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreFailure {}
