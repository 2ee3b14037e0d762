use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Product fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum ProductField {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "quantity")]
    Quantity,
    #[serde(rename = "loanDays")]
    LoanDays,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
}

impl ProductField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Quantity => "quantity",
            ProductField::LoanDays => "loanDays",
            ProductField::Description => "description",
            ProductField::UpdatedAt => "updatedAt",
        }
    }

    /// The message reported when this field fails validation.
    pub fn rule(&self) -> &'static str {
        match self {
            ProductField::Id => "Product id must be a non-empty string.",
            ProductField::Name => "Product name must be a non-empty string.",
            ProductField::Quantity => "Product quantity must be a non-negative integer.",
            ProductField::LoanDays => "Product loanDays must be a non-negative integer.",
            ProductField::Description => "Product description must be a non-empty string.",
            ProductField::UpdatedAt => "updatedAt must be a valid timestamp.",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, ToSchema)]
#[error("{message}")]
pub struct ProductError {
    pub field: ProductField,
    pub message: String,
}

impl ProductError {
    pub fn new(field: ProductField) -> Self {
        Self {
            field,
            message: field.rule().to_string(),
        }
    }
}
