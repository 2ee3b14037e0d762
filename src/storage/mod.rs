pub mod document;
pub mod product_repo;

pub use document::{DocumentStore, MemoryDocumentStore, StoreFailure, StoreOutcome};
pub use product_repo::{DocumentProductRepo, ProductDocument};
