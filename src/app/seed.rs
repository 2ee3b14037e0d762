use crate::domain::model::{create_product, CreateProductParams, Product, ProductError, ProductField, UpdatedAtSource};
use crate::domain::repo::{ProductRepo, RepoError};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed file is not a JSON array of products: {0}")]
    Format(String),
    #[error("seed record {index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ProductError,
    },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

fn sample(
    index: usize,
    id: &str,
    name: &str,
    quantity: i128,
    loan_days: i128,
    description: &str,
    (year, month, day, hour, minute): (i32, u32, u32, u32, u32),
) -> Result<CreateProductParams, SeedError> {
    let updated_at: DateTime<Utc> = Utc
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .ok_or(SeedError::Invalid {
            index,
            source: ProductError::new(ProductField::UpdatedAt),
        })?;

    Ok(CreateProductParams {
        id: id.to_string(),
        name: name.to_string(),
        quantity,
        loan_days,
        description: description.to_string(),
        updated_at,
    })
}

/// Built-in sample catalogue.
pub fn sample_products() -> Result<Vec<CreateProductParams>, SeedError> {
    Ok(vec![
        sample(
            0,
            "widget-001",
            "Widget Deluxe",
            12,
            14,
            "Our flagship widget with polished edges and premium finish.",
            (2024, 1, 5, 12, 0),
        )?,
        sample(
            1,
            "widget-002",
            "Widget Mini",
            30,
            7,
            "Compact widget perfect for on-the-go tinkering.",
            (2024, 2, 12, 8, 30),
        )?,
        sample(
            2,
            "widget-003",
            "Widget Pro Kit",
            5,
            21,
            "Bundle featuring the Widget Deluxe, Mini, and accessory pack.",
            (2024, 3, 20, 16, 45),
        )?,
    ])
}

/// Parses a JSON array of product records, each carrying its own `updatedAt`.
pub fn parse_seed_file(contents: &str) -> Result<Vec<CreateProductParams>, SeedError> {
    let value: JsonValue = serde_json::from_str(contents).map_err(|e| SeedError::Format(e.to_string()))?;
    let records = value
        .as_array()
        .ok_or_else(|| SeedError::Format("top-level value is not an array".to_string()))?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            CreateProductParams::from_json(record, UpdatedAtSource::Field)
                .map_err(|source| SeedError::Invalid { index, source })
        })
        .collect()
}

/// Validates and saves each record in order, stopping at the first failure.
pub async fn seed_products(
    repo: &dyn ProductRepo,
    records: Vec<CreateProductParams>,
) -> Result<Vec<Product>, SeedError> {
    tracing::info!(count = records.len(), "seeding products");

    let mut seeded = Vec::with_capacity(records.len());
    for (index, params) in records.into_iter().enumerate() {
        let product = create_product(params).map_err(|source| SeedError::Invalid { index, source })?;
        let saved = repo.save(&product).await?;
        tracing::info!("Seeded product: {} - {}", saved.id(), saved.name());
        seeded.push(saved);
    }

    tracing::info!("Completed seeding products.");
    Ok(seeded)
}
