// Responsible for all communication with the Cosmos DB REST API.

use super::auth::{aad_authorization, ManagedIdentity, MasterKeySigner};
use super::{CosmosCredential, CosmosOptions};
use crate::infra::config::ConfigError;
use crate::storage::{DocumentStore, StoreFailure, StoreOutcome};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

const API_VERSION: &str = "2018-12-31";
const DEFAULT_PAGE_SIZE: u32 = 100;
const RESOURCE_TYPE_DOCS: &str = "docs";

/// Error codes Cosmos uses for a missing resource, besides HTTP 404 itself.
const NOT_FOUND_CODES: &[&str] = &["404", "NotFound", "ResourceNotFound"];

enum Authorizer {
    MasterKey(MasterKeySigner),
    Aad(ManagedIdentity),
}

/// A single Cosmos container, partitioned by `/id`.
pub struct CosmosStore {
    http: reqwest::Client,
    endpoint: Url,
    database_id: String,
    container_id: String,
    authorizer: Authorizer,
    page_size: u32,
}

#[derive(Deserialize)]
struct FeedPage {
    #[serde(rename = "Documents", default)]
    documents: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<JsonValue>,
    message: Option<String>,
}

impl CosmosStore {
    pub fn new(options: CosmosOptions) -> Result<Self, ConfigError> {
        Self::with_client(options, reqwest::Client::new())
    }

    /// Builds the store around an existing HTTP client. Fails fast when a
    /// connection parameter is missing.
    pub fn with_client(options: CosmosOptions, http: reqwest::Client) -> Result<Self, ConfigError> {
        let endpoint = required("endpoint", &options.endpoint)?;
        let database_id = required("databaseId", &options.database_id)?;
        let container_id = required("containerId", &options.container_id)?;

        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::Invalid {
            name: "endpoint",
            reason: format!("{endpoint}: {e}"),
        })?;
        if endpoint.cannot_be_a_base() || !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "endpoint",
                reason: format!("{endpoint} is not an http(s) URL"),
            });
        }

        let authorizer = match options.credential {
            CosmosCredential::MasterKey(key) => Authorizer::MasterKey(MasterKeySigner::new(&key)?),
            CosmosCredential::ManagedIdentity(source) => {
                let resource = endpoint.origin().ascii_serialization();
                Authorizer::Aad(ManagedIdentity::new(http.clone(), source, resource))
            }
        };

        Ok(Self {
            http,
            endpoint,
            database_id: database_id.to_string(),
            container_id: container_id.to_string(),
            authorizer,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Maximum number of documents requested per feed page when listing.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn collection_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database_id, self.container_id)
    }

    fn document_link(&self, id: &str) -> String {
        format!("{}/docs/{}", self.collection_link(), id)
    }

    fn docs_url(&self, id: Option<&str>) -> Result<Url, StoreFailure> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreFailure::new(format!("cannot address documents under {}", self.endpoint)))?;
            segments
                .pop_if_empty()
                .extend([
                    "dbs",
                    self.database_id.as_str(),
                    "colls",
                    self.container_id.as_str(),
                    "docs",
                ]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Signs and sends one request. Non-2xx responses become `StoreFailure`s.
    async fn send(
        &self,
        method: Method,
        url: Url,
        resource_link: &str,
        partition_key: Option<&str>,
        customize: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, StoreFailure> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let authorization = match &self.authorizer {
            Authorizer::MasterKey(signer) => {
                signer.authorization(method.as_str(), RESOURCE_TYPE_DOCS, resource_link, &date)
            }
            Authorizer::Aad(identity) => aad_authorization(&identity.token().await?),
        };

        let mut request = self
            .http
            .request(method.clone(), url)
            .header("authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION);
        if let Some(key) = partition_key {
            let header = serde_json::to_string(&[key]).map_err(|e| StoreFailure::new(e.to_string()))?;
            request = request.header("x-ms-documentdb-partitionkey", header);
        }

        let response = customize(request)
            .send()
            .await
            .map_err(|e| StoreFailure::new(format!("{method} {resource_link} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let failure = failure_from_response(status, &body);
        tracing::debug!(%method, resource_link, status = status.as_u16(), code = ?failure.code, "cosmos request failed");
        Err(failure)
    }
}

#[async_trait]
impl DocumentStore for CosmosStore {
    fn kind(&self) -> &'static str {
        "cosmos"
    }

    async fn read(&self, id: &str) -> StoreOutcome<JsonValue> {
        let url = match self.docs_url(Some(id)) {
            Ok(url) => url,
            Err(failure) => return StoreOutcome::Failed(failure),
        };
        let link = self.document_link(id);

        match self.send(Method::GET, url, &link, Some(id), |r| r).await {
            Ok(response) => match response.json::<JsonValue>().await {
                Ok(doc) => StoreOutcome::Found(doc),
                Err(e) => StoreOutcome::Failed(StoreFailure::new(format!("invalid document body: {e}"))),
            },
            Err(failure) if is_not_found(&failure) => StoreOutcome::NotFound,
            Err(failure) => StoreOutcome::Failed(failure),
        }
    }

    async fn read_all(&self) -> Result<Vec<JsonValue>, StoreFailure> {
        let link = self.collection_link();
        let mut documents = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let url = self.docs_url(None)?;
            let page_size = self.page_size.to_string();
            let token = continuation.take();
            let response = self
                .send(Method::GET, url, &link, None, |r| {
                    let r = r.header("x-ms-max-item-count", page_size);
                    match token {
                        Some(token) => r.header("x-ms-continuation", token),
                        None => r,
                    }
                })
                .await?;

            continuation = response
                .headers()
                .get("x-ms-continuation")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let page: FeedPage = response
                .json()
                .await
                .map_err(|e| StoreFailure::new(format!("invalid feed page: {e}")))?;
            documents.extend(page.documents);

            if continuation.is_none() {
                break;
            }
        }

        Ok(documents)
    }

    async fn upsert(&self, document: JsonValue) -> Result<Option<JsonValue>, StoreFailure> {
        let id = document
            .get("id")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreFailure::new("document must carry a string id").with_status(400))?;
        let url = self.docs_url(None)?;
        let link = self.collection_link();

        let response = self
            .send(Method::POST, url, &link, Some(&id), |r| {
                r.header("x-ms-documentdb-is-upsert", "True").json(&document)
            })
            .await?;

        let body = response
            .text()
            .await
            .map_err(|e| StoreFailure::new(format!("failed to read upsert response: {e}")))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| StoreFailure::new(format!("invalid upsert response: {e}")))
    }

    async fn delete(&self, id: &str) -> StoreOutcome<()> {
        let url = match self.docs_url(Some(id)) {
            Ok(url) => url,
            Err(failure) => return StoreOutcome::Failed(failure),
        };
        let link = self.document_link(id);

        match self.send(Method::DELETE, url, &link, Some(id), |r| r).await {
            Ok(_) => StoreOutcome::Found(()),
            Err(failure) if is_not_found(&failure) => StoreOutcome::NotFound,
            Err(failure) => StoreOutcome::Failed(failure),
        }
    }
}

fn required<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(value)
}

/// Builds a failure from an error response, keeping the store's `code` and `message`.
pub(crate) fn failure_from_response(status: StatusCode, body: &str) -> StoreFailure {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| match &b.code {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    });
    let message = parsed
        .and_then(|b| b.message)
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let mut failure = StoreFailure::new(message).with_status(status.as_u16());
    failure.code = code;
    failure
}

pub(crate) fn is_not_found(failure: &StoreFailure) -> bool {
    failure.status == Some(StatusCode::NOT_FOUND.as_u16())
        || failure
            .code
            .as_deref()
            .is_some_and(|code| NOT_FOUND_CODES.contains(&code))
}
