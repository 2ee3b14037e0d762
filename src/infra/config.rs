//! Centralized configuration (environment variables + defaults).
//!
//! Everything is parsed through a lookup function so tests can supply their
//! own variables instead of touching the process environment.

use crate::infra::cosmos::{CosmosCredential, CosmosOptions, IdentitySource};
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE_ID: &str = "catalogue-db";
pub const DEFAULT_CONTAINER_ID: &str = "loanitems";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which document store backs the product repository.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Cosmos(CosmosOptions),
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen: SocketAddr,
    pub store: StoreBackend,
}

impl ServiceConfig {
    /// Reads the process environment. Binaries load `.env` before calling this.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let listen_raw = get("API_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "API_LISTEN",
                reason: format!("{listen_raw}: {e}"),
            })?;

        let backend = get("CATALOGUE_STORE").unwrap_or_else(|| "cosmos".to_string());
        let store = match backend.trim().to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "cosmos" => StoreBackend::Cosmos(cosmos_options(&get)?),
            other => {
                return Err(ConfigError::Invalid {
                    name: "CATALOGUE_STORE",
                    reason: format!("unknown store '{other}' (expected 'cosmos' or 'memory')"),
                })
            }
        };

        Ok(Self { listen, store })
    }
}

fn cosmos_options<F>(get: &F) -> Result<CosmosOptions, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = get("COSMOS_ENDPOINT").ok_or(ConfigError::Missing("COSMOS_ENDPOINT"))?;

    let credential = match get("COSMOS_KEY") {
        Some(key) => CosmosCredential::MasterKey(key),
        None => {
            let client_id = get("AZURE_CLIENT_ID");
            let source = match (get("IDENTITY_ENDPOINT"), get("IDENTITY_HEADER")) {
                (Some(endpoint), Some(header)) => IdentitySource::AppService {
                    endpoint,
                    header,
                    client_id,
                },
                _ => IdentitySource::Imds { client_id },
            };
            CosmosCredential::ManagedIdentity(source)
        }
    };

    Ok(CosmosOptions {
        endpoint,
        database_id: get("COSMOS_DATABASE_ID").unwrap_or_else(|| DEFAULT_DATABASE_ID.to_string()),
        container_id: get("COSMOS_CONTAINER_ID")
            .unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_string()),
        credential,
    })
}
