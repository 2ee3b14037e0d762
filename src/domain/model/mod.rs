//! Domain model for catalogue products.

pub mod error;
pub mod product;

pub use error::{ProductError, ProductField};
pub use product::{
    create_product, format_timestamp, parse_timestamp, CreateProductParams, Product,
    UpdatedAtSource,
};
