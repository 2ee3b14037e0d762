pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{CatalogueService, SystemClock};
pub use domain::model::{create_product, CreateProductParams, Product, ProductError};
pub use domain::repo::{ProductRepo, RepoError};
pub use infra::config::ServiceConfig;
