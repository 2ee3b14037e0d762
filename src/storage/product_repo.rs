//! `ProductRepo` over any `DocumentStore`.

use crate::domain::model::{
    create_product, format_timestamp, parse_timestamp, CreateProductParams, Product,
};
use crate::domain::repo::{IntegrityError, ProductRepo, RepoError, RepoOperation};
use crate::storage::document::{DocumentStore, StoreFailure, StoreOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Persisted shape of a product. System properties added by the store are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    pub id: String,
    pub name: String,
    pub description: String,
    pub quantity: u64,
    pub loan_days: u64,
    pub updated_at: String,
}

impl ProductDocument {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            quantity: product.quantity(),
            loan_days: product.loan_days(),
            updated_at: format_timestamp(&product.updated_at()),
        }
    }

    pub fn into_product(self) -> Result<Product, IntegrityError> {
        let updated_at = parse_timestamp(&self.updated_at)
            .ok_or_else(|| IntegrityError::InvalidTimestamp(self.updated_at.clone()))?;
        let id = self.id.clone();

        create_product(CreateProductParams {
            id: self.id,
            name: self.name,
            quantity: i128::from(self.quantity),
            loan_days: i128::from(self.loan_days),
            description: self.description,
            updated_at,
        })
        .map_err(|source| IntegrityError::InvalidProduct { id, source })
    }
}

pub struct DocumentProductRepo<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> DocumentProductRepo<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn decode(operation: RepoOperation, document: JsonValue) -> Result<Product, RepoError> {
    serde_json::from_value::<ProductDocument>(document)
        .map_err(|e| IntegrityError::MalformedDocument(e.to_string()))
        .and_then(ProductDocument::into_product)
        .map_err(|source| RepoError::Integrity { operation, source })
}

fn wrap(operation: RepoOperation, failure: StoreFailure) -> RepoError {
    RepoError::Store {
        operation,
        status: failure.status,
        message: failure.message,
    }
}

#[async_trait]
impl<S: DocumentStore + 'static> ProductRepo for DocumentProductRepo<S> {
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>, RepoError> {
        match self.store.read(id).await {
            StoreOutcome::Found(doc) => decode(RepoOperation::Get, doc).map(Some),
            StoreOutcome::NotFound => {
                tracing::debug!(store = self.store.kind(), id, "product not found");
                Ok(None)
            }
            StoreOutcome::Failed(failure) => Err(wrap(RepoOperation::Get, failure)),
        }
    }

    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        let documents = self
            .store
            .read_all()
            .await
            .map_err(|f| wrap(RepoOperation::List, f))?;

        documents
            .into_iter()
            .map(|doc| decode(RepoOperation::List, doc))
            .collect()
    }

    async fn save(&self, product: &Product) -> Result<Product, RepoError> {
        let document = serde_json::to_value(ProductDocument::from_product(product)).map_err(|e| {
            RepoError::Store {
                operation: RepoOperation::Save,
                status: None,
                message: e.to_string(),
            }
        })?;

        match self.store.upsert(document).await {
            Ok(Some(stored)) => decode(RepoOperation::Save, stored),
            Ok(None) => Err(wrap(
                RepoOperation::Save,
                StoreFailure::new(format!("No document returned from {} upsert", self.store.kind())),
            )),
            Err(failure) => Err(wrap(RepoOperation::Save, failure)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        match self.store.delete(id).await {
            StoreOutcome::Found(()) | StoreOutcome::NotFound => Ok(()),
            StoreOutcome::Failed(failure) => Err(wrap(RepoOperation::Delete, failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProductField;
    use crate::storage::document::MemoryDocumentStore;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn product(id: &str) -> Product {
        create_product(CreateProductParams {
            id: id.to_string(),
            name: "Test Product".to_string(),
            quantity: 25,
            loan_days: 2,
            description: "A great test product".to_string(),
            updated_at: Utc.timestamp_millis_opt(1_735_689_600_123).unwrap(),
        })
        .unwrap()
    }

    fn repo() -> (Arc<MemoryDocumentStore>, DocumentProductRepo<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        (store.clone(), DocumentProductRepo::new(store))
    }

    /// Store whose every call fails with the same message.
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        fn kind(&self) -> &'static str {
            "broken"
        }
        async fn read(&self, _id: &str) -> StoreOutcome<JsonValue> {
            StoreOutcome::Failed(StoreFailure::new("connection reset").with_status(503))
        }
        async fn read_all(&self) -> Result<Vec<JsonValue>, StoreFailure> {
            Err(StoreFailure::new("connection reset"))
        }
        async fn upsert(&self, _document: JsonValue) -> Result<Option<JsonValue>, StoreFailure> {
            Err(StoreFailure::new("connection reset").with_status(503))
        }
        async fn delete(&self, _id: &str) -> StoreOutcome<()> {
            StoreOutcome::Failed(StoreFailure::new("connection reset"))
        }
    }

    /// Store that accepts writes but never echoes the document back.
    struct SilentStore;

    #[async_trait]
    impl DocumentStore for SilentStore {
        fn kind(&self) -> &'static str {
            "silent"
        }
        async fn read(&self, _id: &str) -> StoreOutcome<JsonValue> {
            StoreOutcome::NotFound
        }
        async fn read_all(&self) -> Result<Vec<JsonValue>, StoreFailure> {
            Ok(Vec::new())
        }
        async fn upsert(&self, _document: JsonValue) -> Result<Option<JsonValue>, StoreFailure> {
            Ok(None)
        }
        async fn delete(&self, _id: &str) -> StoreOutcome<()> {
            StoreOutcome::NotFound
        }
    }

    #[tokio::test]
    async fn save_then_get_returns_equal_product() {
        let (_store, repo) = repo();
        let saved = repo.save(&product("prod-123")).await.unwrap();
        assert_eq!(saved, product("prod-123"));

        let loaded = repo.get_by_id("prod-123").await.unwrap();
        assert_eq!(loaded, Some(product("prod-123")));
    }

    #[tokio::test]
    async fn save_replaces_existing_record() {
        let (store, repo) = repo();
        repo.save(&product("prod-1")).await.unwrap();

        let replacement = create_product(CreateProductParams {
            id: "prod-1".to_string(),
            name: "Renamed".to_string(),
            quantity: 0,
            loan_days: 7,
            description: "Second edition".to_string(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        })
        .unwrap();
        repo.save(&replacement).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(repo.get_by_id("prod-1").await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn writes_documented_shape() {
        let (store, repo) = repo();
        repo.save(&product("prod-123")).await.unwrap();

        match store.read("prod-123").await {
            StoreOutcome::Found(doc) => assert_eq!(
                doc,
                json!({
                    "id": "prod-123",
                    "name": "Test Product",
                    "description": "A great test product",
                    "quantity": 25,
                    "loanDays": 2,
                    "updatedAt": "2025-01-01T00:00:00.123Z"
                })
            ),
            other => panic!("expected stored document, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn counts_beyond_i64_are_stored_unclamped() {
        let (store, repo) = repo();
        let big = create_product(CreateProductParams {
            id: "bulk".to_string(),
            name: "Bulk".to_string(),
            quantity: i128::from(u64::MAX),
            loan_days: 10_000_000_000_000_000_000,
            description: "Very many".to_string(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        })
        .unwrap();

        assert_eq!(repo.save(&big).await.unwrap(), big);
        match store.read("bulk").await {
            StoreOutcome::Found(doc) => {
                assert_eq!(doc["quantity"], json!(u64::MAX));
                assert_eq!(doc["loanDays"], json!(10_000_000_000_000_000_000u64));
            }
            other => panic!("expected stored document, got {other:?}"),
        }
        assert_eq!(repo.get_by_id("bulk").await.unwrap(), Some(big));
    }

    #[tokio::test]
    async fn missing_ids_are_absent_not_errors() {
        let (_store, repo) = repo();
        assert_eq!(repo.get_by_id("never-saved").await.unwrap(), None);

        repo.delete("never-saved").await.unwrap();
        repo.delete("never-saved").await.unwrap();
        assert_eq!(repo.get_by_id("never-saved").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (_store, repo) = repo();
        repo.save(&product("prod-9")).await.unwrap();
        repo.delete("prod-9").await.unwrap();
        assert_eq!(repo.get_by_id("prod-9").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_returns_every_record() {
        let (_store, repo) = repo();
        assert!(repo.list().await.unwrap().is_empty());

        for id in ["a", "b", "c"] {
            repo.save(&product(id)).await.unwrap();
        }
        let mut ids: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unparsable_timestamp_is_an_integrity_error() {
        let (store, repo) = repo();
        store
            .upsert(json!({
                "id": "bad",
                "name": "Broken",
                "description": "Timestamp went missing",
                "quantity": 1,
                "loanDays": 1,
                "updatedAt": "sometime"
            }))
            .await
            .unwrap();

        let err = repo.get_by_id("bad").await.unwrap_err();
        assert!(err.is_integrity());
        assert_eq!(
            err.to_string(),
            "Unable to get product: Invalid updatedAt value from document store: sometime"
        );

        let err = repo.list().await.unwrap_err();
        assert_eq!(err.operation(), RepoOperation::List);
        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn invalid_stored_fields_are_integrity_errors() {
        let (store, repo) = repo();
        store
            .upsert(json!({
                "id": "blank",
                "name": "   ",
                "description": "Nameless",
                "quantity": 4,
                "loanDays": 1,
                "updatedAt": "2025-01-01T00:00:00Z"
            }))
            .await
            .unwrap();
        store.upsert(json!({ "id": "partial", "name": "Half a record" })).await.unwrap();

        match repo.get_by_id("blank").await.unwrap_err() {
            RepoError::Integrity {
                source: IntegrityError::InvalidProduct { id, source },
                ..
            } => {
                assert_eq!(id, "blank");
                assert_eq!(source.field, ProductField::Name);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match repo.get_by_id("partial").await.unwrap_err() {
            RepoError::Integrity {
                source: IntegrityError::MalformedDocument(_),
                ..
            } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_failures_are_wrapped_with_operation() {
        let repo = DocumentProductRepo::new(Arc::new(BrokenStore));

        let err = repo.get_by_id("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to get product: connection reset");

        let err = repo.list().await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to list products: connection reset");

        let err = repo.save(&product("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to save product: connection reset");
        assert!(matches!(err, RepoError::Store { status: Some(503), .. }));

        let err = repo.delete("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to delete product: connection reset");
    }

    #[tokio::test]
    async fn save_without_echoed_document_fails() {
        let repo = DocumentProductRepo::new(Arc::new(SilentStore));
        let err = repo.save(&product("x")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to save product: No document returned from silent upsert"
        );
    }
}
