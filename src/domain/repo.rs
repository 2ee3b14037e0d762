//! The product repository contract.
//!
//! Implementations translate `Product` values to and from a backing store.
//! Absence is a normal result (`Ok(None)` from `get_by_id`, `Ok(())` from
//! `delete`); every other failure is a `RepoError` whose message starts with
//! the operation that failed.

use crate::domain::model::{Product, ProductError};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Returns the product stored under `id`, or `None` if there is none.
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>, RepoError>;

    /// Returns every stored product. Order is unspecified.
    async fn list(&self) -> Result<Vec<Product>, RepoError>;

    /// Inserts or fully replaces the product and returns it as read back from the store.
    async fn save(&self, product: &Product) -> Result<Product, RepoError>;

    /// Removes the product. Deleting an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<(), RepoError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOperation {
    Get,
    List,
    Save,
    Delete,
}

impl fmt::Display for RepoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            RepoOperation::Get => "Unable to get product",
            RepoOperation::List => "Unable to list products",
            RepoOperation::Save => "Unable to save product",
            RepoOperation::Delete => "Unable to delete product",
        };
        f.write_str(prefix)
    }
}

/// Persisted data that cannot be turned back into a `Product`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("Invalid updatedAt value from document store: {0}")]
    InvalidTimestamp(String),
    #[error("Malformed product document: {0}")]
    MalformedDocument(String),
    #[error("Stored product '{id}' is invalid: {source}")]
    InvalidProduct {
        id: String,
        #[source]
        source: ProductError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// The store returned data that does not map to a valid product.
    #[error("{operation}: {source}")]
    Integrity {
        operation: RepoOperation,
        #[source]
        source: IntegrityError,
    },
    /// The store (or the transport to it) reported a failure.
    #[error("{operation}: {message}")]
    Store {
        operation: RepoOperation,
        status: Option<u16>,
        message: String,
    },
}

impl RepoError {
    pub fn operation(&self) -> RepoOperation {
        match self {
            RepoError::Integrity { operation, .. } | RepoError::Store { operation, .. } => *operation,
        }
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, RepoError::Integrity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_operation_prefix() {
        let err = RepoError::Store {
            operation: RepoOperation::Save,
            status: Some(503),
            message: "service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Unable to save product: service unavailable");
        assert!(!err.is_integrity());

        let err = RepoError::Integrity {
            operation: RepoOperation::List,
            source: IntegrityError::InvalidTimestamp("yesterday".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unable to list products: Invalid updatedAt value from document store: yesterday"
        );
        assert_eq!(err.operation(), RepoOperation::List);
    }
}
