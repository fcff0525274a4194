//! Pool manager client for an aggregation service speaking JSON over HTTP.

use super::{ManagerError, PoolManager, PoolManagerFactory};
use crate::domain::{Address, PoolPosition, TokenAmount, Underlyings};
use crate::wallet::ChainAccess;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const POOL_SCOPE: &str = "all_past";

/// Creates `HttpPoolManager` handles that share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpPoolManagerFactory {
    client: Client,
    base_url: String,
    max_retry: Duration,
}

impl HttpPoolManagerFactory {
    pub fn new(base_url: String, max_retry: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retry,
        }
    }
}

impl PoolManagerFactory for HttpPoolManagerFactory {
    fn all_past_pools(&self, access: ChainAccess) -> Result<Arc<dyn PoolManager>, ManagerError> {
        info!(
            base_url = %self.base_url,
            read_only = access.is_read_only(),
            "binding pool manager to all past pools"
        );
        Ok(Arc::new(HttpPoolManager {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            max_retry: self.max_retry,
            access,
        }))
    }
}

/// Manager handle bound to one `ChainAccess`.
///
/// Reads are retried with exponential backoff on transient failures. Writes
/// are sent exactly once since they are not idempotent.
#[derive(Debug, Clone)]
pub struct HttpPoolManager {
    client: Client,
    base_url: String,
    max_retry: Duration,
    access: ChainAccess,
}

impl HttpPoolManager {
    async fn query<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<T, ManagerError> {
        let url = format!("{}{}", self.base_url, path);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_retry),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(ManagerError::Network(e.to_string())))?;

            let response = check_status(response).map_err(|e| {
                if is_transient(&e) {
                    warn!("transient aggregator failure on {}: {}", url, e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })?;

            response
                .json::<T>()
                .await
                .map_err(|e| backoff::Error::permanent(ManagerError::Malformed(e.to_string())))
        })
        .await
    }

    async fn submit(&self, path: &str, mut payload: serde_json::Value) -> Result<(), ManagerError> {
        let signer = match &self.access {
            ChainAccess::Signer(signer) => signer,
            ChainAccess::ReadOnly(_) => return Err(ManagerError::ReadOnly),
        };
        let from = signer
            .address()
            .await
            .map_err(|e| ManagerError::Rejected(e.to_string()))?;
        payload["from"] = serde_json::Value::String(from.to_string());

        let url = format!("{}{}", self.base_url, path);
        debug!("submitting {} for {}", path, from);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ManagerError::Network(e.to_string()))?;
        check_status(response).map(|_| ())
    }
}

fn check_status(response: Response) -> Result<Response, ManagerError> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(ManagerError::RateLimited);
    }
    if status.is_server_error() {
        return Err(ManagerError::Http {
            status: status.as_u16(),
            message: "Server error".to_string(),
        });
    }
    if !status.is_success() {
        return Err(ManagerError::Http {
            status: status.as_u16(),
            message: "Client error".to_string(),
        });
    }
    Ok(response)
}

fn is_transient(error: &ManagerError) -> bool {
    match error {
        ManagerError::RateLimited => true,
        ManagerError::Http { status, .. } => *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl PoolManager for HttpPoolManager {
    async fn aggregate_underlyings(
        &self,
        address: &Address,
    ) -> Result<Underlyings, ManagerError> {
        debug!("fetching underlyings for {}", address);
        self.query(
            "/v1/underlyings",
            serde_json::json!({ "address": address, "pools": POOL_SCOPE }),
        )
        .await
    }

    async fn summary(&self, address: &Address) -> Result<Vec<PoolPosition>, ManagerError> {
        debug!("fetching pool summaries for {}", address);
        self.query(
            "/v1/summary",
            serde_json::json!({ "address": address, "pools": POOL_SCOPE }),
        )
        .await
    }

    async fn get_rewards(&self, minimum: TokenAmount) -> Result<(), ManagerError> {
        self.submit(
            "/v1/rewards",
            serde_json::json!({ "minimum": minimum, "pools": POOL_SCOPE }),
        )
        .await
    }

    async fn exit_inactive(&self) -> Result<(), ManagerError> {
        self.submit("/v1/exit-inactive", serde_json::json!({ "pools": POOL_SCOPE }))
            .await
    }
}
