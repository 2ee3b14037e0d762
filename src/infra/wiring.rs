//! Builds the product repository selected by configuration.

use crate::domain::repo::ProductRepo;
use crate::infra::config::{ConfigError, StoreBackend};
use crate::infra::cosmos::CosmosStore;
use crate::storage::{DocumentProductRepo, DocumentStore, MemoryDocumentStore};
use std::sync::Arc;

/// A repository together with the name of the store behind it.
#[derive(Clone)]
pub struct RepoHandle {
    pub repo: Arc<dyn ProductRepo>,
    pub store_kind: &'static str,
}

impl RepoHandle {
    pub fn over<S: DocumentStore + 'static>(store: S) -> Self {
        let store_kind = store.kind();
        Self {
            repo: Arc::new(DocumentProductRepo::new(Arc::new(store))),
            store_kind,
        }
    }
}

/// Constructed once at startup and passed to whoever needs it.
pub fn build_product_repo(backend: &StoreBackend) -> Result<RepoHandle, ConfigError> {
    let handle = match backend {
        StoreBackend::Cosmos(options) => {
            tracing::info!(
                endpoint = %options.endpoint,
                database = %options.database_id,
                container = %options.container_id,
                "using Cosmos DB document store"
            );
            RepoHandle::over(CosmosStore::new(options.clone())?)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory document store; data is lost on exit");
            RepoHandle::over(MemoryDocumentStore::new())
        }
    };
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::cosmos::{CosmosCredential, CosmosOptions};

    #[test]
    fn memory_backend_builds_memory_repo() {
        let handle = build_product_repo(&StoreBackend::Memory).unwrap();
        assert_eq!(handle.store_kind, "memory");
    }

    #[test]
    fn cosmos_backend_fails_fast_on_blank_container() {
        let backend = StoreBackend::Cosmos(CosmosOptions {
            endpoint: "https://acct.documents.azure.com/".to_string(),
            database_id: "catalogue-db".to_string(),
            container_id: String::new(),
            credential: CosmosCredential::MasterKey("c2VjcmV0".to_string()),
        });
        assert!(matches!(
            build_product_repo(&backend),
            Err(ConfigError::Missing("containerId"))
        ));
    }
}
