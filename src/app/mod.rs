pub mod catalogue_service;
pub mod seed;

pub use catalogue_service::{CatalogueService, Clock, FixedClock, SystemClock, UpsertError};
