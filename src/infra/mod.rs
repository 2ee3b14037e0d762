pub mod config;
pub mod cosmos;
pub mod logging;
pub mod wiring;
