//! In-process document store, for local runs and tests.

use super::{DocumentStore, StoreFailure, StoreOutcome};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, id: &str) -> StoreOutcome<JsonValue> {
        match self.documents.read().await.get(id) {
            Some(doc) => StoreOutcome::Found(doc.clone()),
            None => StoreOutcome::NotFound,
        }
    }

    async fn read_all(&self) -> Result<Vec<JsonValue>, StoreFailure> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn upsert(&self, document: JsonValue) -> Result<Option<JsonValue>, StoreFailure> {
        let id = document
            .get("id")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                StoreFailure::new("document must carry a string id")
                    .with_status(400)
                    .with_code("BadRequest")
            })?;

        self.documents.write().await.insert(id, document.clone());
        Ok(Some(document))
    }

    async fn delete(&self, id: &str) -> StoreOutcome<()> {
        match self.documents.write().await.remove(id) {
            Some(_) => StoreOutcome::Found(()),
            None => StoreOutcome::NotFound,
        }
    }
}
