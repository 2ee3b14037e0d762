//! Authorization tokens for the Cosmos DB REST API.
//!
//! Two schemes are supported: a shared master key (HMAC-SHA256 request
//! signatures) and Microsoft Entra tokens obtained from the ambient managed
//! identity of the host.

use crate::infra::config::ConfigError;
use crate::storage::StoreFailure;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::fmt;
use tokio::sync::Mutex;

const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Where a managed identity token comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// Azure Instance Metadata Service (VMs, AKS, container instances).
    Imds { client_id: Option<String> },
    /// App Service / Functions identity endpoint (`IDENTITY_ENDPOINT` + `IDENTITY_HEADER`).
    AppService {
        endpoint: String,
        header: String,
        client_id: Option<String>,
    },
}

impl fmt::Debug for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentitySource::Imds { client_id } => f
                .debug_struct("Imds")
                .field("client_id", client_id)
                .finish(),
            IdentitySource::AppService {
                endpoint, client_id, ..
            } => f
                .debug_struct("AppService")
                .field("endpoint", endpoint)
                .field("header", &"<redacted>")
                .field("client_id", client_id)
                .finish(),
        }
    }
}

/// Signs requests with the account master key.
#[derive(Clone)]
pub struct MasterKeySigner {
    mac: Hmac<Sha256>,
}

impl MasterKeySigner {
    /// `key` is the base64 account key as shown in the portal.
    pub fn new(key: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            name: "COSMOS_KEY",
            reason,
        };
        let raw = BASE64
            .decode(key.trim())
            .map_err(|e| invalid(format!("not base64: {e}")))?;
        let mac = Hmac::<Sha256>::new_from_slice(&raw).map_err(|e| invalid(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Returns the URL-encoded `authorization` header value for one request.
    ///
    /// Everything but `resource_link` is lower-cased before signing; `date`
    /// must be the exact `x-ms-date` header sent with the request.
    pub fn authorization(&self, verb: &str, resource_type: &str, resource_link: &str, date: &str) -> String {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        encode_token("master", &signature)
    }
}

impl fmt::Debug for MasterKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKeySigner(<redacted>)")
    }
}

/// `authorization` header value for an Entra access token.
pub fn aad_authorization(token: &str) -> String {
    encode_token("aad", token)
}

fn encode_token(kind: &str, signature: &str) -> String {
    let token = format!("type={kind}&ver=1.0&sig={signature}");
    url::form_urlencoded::byte_serialize(token.as_bytes()).collect()
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Seconds since the epoch; identity endpoints send it as a string or a number.
    expires_on: serde_json::Value,
}

struct CachedToken {
    value: String,
    expires_on: DateTime<Utc>,
}

/// Fetches and caches managed identity tokens for one resource.
pub struct ManagedIdentity {
    http: reqwest::Client,
    source: IdentitySource,
    resource: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ManagedIdentity {
    /// `resource` is the audience the token is issued for, e.g. `https://acct.documents.azure.com`.
    pub fn new(http: reqwest::Client, source: IdentitySource, resource: impl Into<String>) -> Self {
        Self {
            http,
            source,
            resource: resource.into(),
            cached: Mutex::new(None),
        }
    }

    /// Returns a token that stays valid for at least the refresh margin.
    pub async fn token(&self) -> Result<String, StoreFailure> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_on - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch().await?;
        tracing::debug!(expires_on = %fresh.expires_on, "acquired managed identity token");
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch(&self) -> Result<CachedToken, StoreFailure> {
        let request = match &self.source {
            IdentitySource::Imds { client_id } => {
                let mut query = vec![
                    ("api-version", IMDS_API_VERSION),
                    ("resource", self.resource.as_str()),
                ];
                if let Some(id) = client_id {
                    query.push(("client_id", id.as_str()));
                }
                self.http
                    .get(IMDS_TOKEN_URL)
                    .header("Metadata", "true")
                    .query(&query)
            }
            IdentitySource::AppService {
                endpoint,
                header,
                client_id,
            } => {
                let mut query = vec![
                    ("api-version", APP_SERVICE_API_VERSION),
                    ("resource", self.resource.as_str()),
                ];
                if let Some(id) = client_id {
                    query.push(("client_id", id.as_str()));
                }
                self.http
                    .get(endpoint.as_str())
                    .header("X-IDENTITY-HEADER", header.as_str())
                    .query(&query)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| StoreFailure::new(format!("managed identity request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreFailure::new(format!(
                "managed identity endpoint returned {}: {}",
                status.as_u16(),
                body.trim()
            ))
            .with_status(status.as_u16()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreFailure::new(format!("invalid managed identity response: {e}")))?;
        let expires_on = parse_expires_on(&body.expires_on)
            .ok_or_else(|| StoreFailure::new("managed identity response has no usable expires_on"))?;

        Ok(CachedToken {
            value: body.access_token,
            expires_on,
        })
    }
}

fn parse_expires_on(raw: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match raw {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0)
}
