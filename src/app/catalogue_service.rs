//! Catalogue use cases: upsert, list, get and delete products.
//!
//! The service owns no state of its own; the repository and clock are passed
//! in at construction so callers decide which store and time source to use.

use crate::domain::model::{create_product, CreateProductParams, Product, ProductError, UpdatedAtSource};
use crate::domain::repo::{ProductRepo, RepoError};
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum UpsertError {
    #[error(transparent)]
    Invalid(#[from] ProductError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct CatalogueService {
    repo: Arc<dyn ProductRepo>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    pub fn new(repo: Arc<dyn ProductRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Validates an untrusted product body, stamps it with the current time and saves it.
    pub async fn upsert_product(&self, body: &JsonValue) -> Result<Product, UpsertError> {
        let params = CreateProductParams::from_json(body, UpdatedAtSource::Supplied(self.clock.now()))?;
        let product = create_product(params)?;
        let saved = self.repo.save(&product).await?;
        tracing::info!(id = saved.id(), "product upserted");
        Ok(saved)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, RepoError> {
        self.repo.list().await
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, RepoError> {
        self.repo.get_by_id(id).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), RepoError> {
        self.repo.delete(id).await?;
        tracing::info!(id, "product deleted");
        Ok(())
    }
}
