//! Elasticsearch search index.
//!
//! Live [`SearchIndex`] backend. Writes use `refresh=wait_for` so a
//! successful call means the document is already searchable, which is what
//! lets the API serve reads from the index immediately after a write.

use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::params::Refresh;
use elasticsearch::{DeleteParts, Elasticsearch, GetParts, IndexParts, SearchParts};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::index::{SearchHit, SearchIndex, SearchPage, SearchQuery};

/// Authentication for the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElasticAuth {
    /// Basic username/password.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// Encoded API key, the managed-cluster default.
    ApiKey {
        /// Base64-encoded `id:key` pair.
        key: String,
    },
}

/// Connection configuration for [`ElasticIndex`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Node URL, e.g. `http://localhost:9200`.
    pub node: String,
    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticAuth>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Skip TLS certificate validation. Development only.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            node: "http://localhost:9200".to_string(),
            auth: None,
            request_timeout_ms: default_request_timeout_ms(),
            disable_certificate_validation: false,
        }
    }
}

/// [`SearchIndex`] backed by an Elasticsearch cluster.
pub struct ElasticIndex {
    client: Elasticsearch,
}

impl std::fmt::Debug for ElasticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticIndex").finish_non_exhaustive()
    }
}

fn unavailable(message: impl Into<String>) -> IndexError {
    IndexError::Unavailable {
        message: message.into(),
    }
}

impl ElasticIndex {
    /// Builds a client from configuration. Does not contact the cluster;
    /// call [`SearchIndex::ping`] for that.
    pub fn new(config: &ElasticConfig) -> IndexResult<Self> {
        let url: elasticsearch::http::Url = config
            .node
            .parse()
            .map_err(|e| unavailable(format!("invalid node URL: {e}")))?;
        let mut builder = TransportBuilder::new(SingleNodeConnectionPool::new(url))
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }
        if let Some(auth) = &config.auth {
            builder = match auth {
                ElasticAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticAuth::ApiKey { key } => {
                    builder.auth(Credentials::EncodedApiKey(key.clone()))
                }
            };
        }
        let transport = builder
            .build()
            .map_err(|e| unavailable(format!("failed to build transport: {e}")))?;
        Ok(Self {
            client: Elasticsearch::new(transport),
        })
    }
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn put(&self, index: &str, id: &str, document: Value) -> IndexResult<()> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .refresh(Refresh::WaitFor)
            .body(document)
            .send()
            .await
            .map_err(|e| IndexError::WriteFailed {
                index: index.to_string(),
                id: id.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::WriteFailed {
                index: index.to_string(),
                id: id.to_string(),
                message: format!("status {status}: {body}"),
            });
        }
        debug!(index, id, "indexed document");
        Ok(())
    }

    async fn remove(&self, index: &str, entity: &str, id: &str) -> IndexResult<()> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .refresh(Refresh::WaitFor)
            .send()
            .await
            .map_err(|e| IndexError::WriteFailed {
                index: index.to_string(),
                id: id.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(IndexError::NotFoundInIndex {
                index: index.to_string(),
                entity: entity.to_string(),
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::WriteFailed {
                index: index.to_string(),
                id: id.to_string(),
                message: format!("status {status}: {body}"),
            });
        }
        debug!(index, id, "removed document");
        Ok(())
    }

    async fn get(&self, index: &str, id: &str) -> IndexResult<Option<Value>> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(None);
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        Ok(body.get("_source").cloned())
    }

    async fn search(&self, index: &str, query: &SearchQuery) -> IndexResult<SearchPage> {
        let body = query.to_body();
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| IndexError::SearchFailed {
                index: index.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::SearchFailed {
                index: index.to_string(),
                message: format!("status {status}: {body}"),
            });
        }
        let body: Value = response.json().await.map_err(|e| IndexError::SearchFailed {
            index: index.to_string(),
            message: e.to_string(),
        })?;

        let total = body["hits"]["total"]["value"].as_u64().unwrap_or(0);
        let hits = body["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| {
                        let id = hit.get("_id")?.as_str()?.to_string();
                        let source = hit.get("_source").cloned().unwrap_or(Value::Null);
                        Some(SearchHit { id, source })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(SearchPage { hits, total })
    }

    async fn ping(&self) -> IndexResult<()> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if !response.status_code().is_success() {
            return Err(unavailable(format!(
                "ping returned status {}",
                response.status_code()
            )));
        }
        Ok(())
    }
}
