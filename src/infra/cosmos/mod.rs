//! Azure Cosmos DB (SQL API) document store over the REST interface.

pub mod auth;
pub mod client;

pub use auth::{IdentitySource, ManagedIdentity, MasterKeySigner};
pub use client::CosmosStore;

use std::fmt;

/// How requests to the account are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum CosmosCredential {
    /// Base64 account key.
    MasterKey(String),
    /// Ambient managed identity of the host.
    ManagedIdentity(IdentitySource),
}

impl fmt::Debug for CosmosCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CosmosCredential::MasterKey(_) => f.write_str("MasterKey(<redacted>)"),
            CosmosCredential::ManagedIdentity(source) => {
                f.debug_tuple("ManagedIdentity").field(source).finish()
            }
        }
    }
}

/// Connection parameters for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosmosOptions {
    pub endpoint: String,
    pub database_id: String,
    pub container_id: String,
    pub credential: CosmosCredential,
}
