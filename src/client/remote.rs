//! Remote Data Plane Client
//!
//! HTTP client for data planes reachable over the network.
//!
//! ```text
//! POST   {url}/transfer               body: DataFlowRequest (JSON)
//! DELETE {url}/transfer/{processId}
//! ```
//!
//! Status mapping: 2xx is success, 404 on terminate is a no-op success, other
//! 4xx are `FATAL_ERROR`, 5xx and transport errors are `ERROR_RETRY`.
//!
//! A 404 on terminate is indistinguishable from a misconfigured base path, so
//! it is logged at `warn` with the full URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use super::{DataPlaneClient, DataPlaneClientFactory};
use crate::error::ConfigError;
use crate::selector::DataPlaneInstance;
use crate::status::{StatusFailure, StatusResult};
use crate::types::DataFlowRequest;

const TRANSFER_PATH: &str = "transfer";

/// Builds HTTP clients sharing one connection pool
#[derive(Clone)]
pub struct RemoteDataPlaneClientFactory {
    http: reqwest::Client,
}

impl RemoteDataPlaneClientFactory {
    /// `timeout` bounds each request end to end
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl DataPlaneClientFactory for RemoteDataPlaneClientFactory {
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient> {
        Arc::new(RemoteDataPlaneClient {
            http: self.http.clone(),
            instance_id: instance.id.clone(),
            base_url: instance.url.clone(),
        })
    }
}

pub struct RemoteDataPlaneClient {
    http: reqwest::Client,
    instance_id: String,
    base_url: Url,
}

impl RemoteDataPlaneClient {
    fn endpoint(&self, segments: &[&str]) -> StatusResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StatusFailure::fatal(format!("data plane url {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map a transport error: building the request is our fault, everything else is transient
fn transport_failure(e: reqwest::Error) -> StatusFailure {
    if e.is_builder() {
        StatusFailure::fatal(format!("invalid request: {}", e))
    } else {
        StatusFailure::retry(format!("transport error: {}", e))
    }
}

async fn status_failure(response: reqwest::Response) -> StatusFailure {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = if body.is_empty() {
        format!("data plane responded {}", status)
    } else {
        format!("data plane responded {}: {}", status, body)
    };

    if status.is_server_error() {
        StatusFailure::retry(reason)
    } else {
        StatusFailure::fatal(reason)
    }
}

#[async_trait]
impl DataPlaneClient for RemoteDataPlaneClient {
    async fn transfer(&self, request: &DataFlowRequest) -> StatusResult<()> {
        let url = self.endpoint(&[TRANSFER_PATH])?;
        debug!(
            instance_id = %self.instance_id,
            process_id = %request.process_id,
            request_id = %request.id,
            url = %url,
            "Dispatching data flow"
        );

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport_failure)?;

        if response.status().is_success() {
            return Ok(());
        }

        let failure = status_failure(response).await;
        warn!(
            instance_id = %self.instance_id,
            process_id = %request.process_id,
            error = %failure,
            "Data plane rejected transfer"
        );
        Err(failure)
    }

    async fn terminate(&self, process_id: &str) -> StatusResult<()> {
        let url = self.endpoint(&[TRANSFER_PATH, process_id])?;
        let response = self
            .http
            .delete(url.clone())
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            warn!(
                instance_id = %self.instance_id,
                process_id = %process_id,
                url = %url,
                "Data plane answered 404 on terminate, treating as no flow for process"
            );
            return Ok(());
        }

        Err(status_failure(response).await)
    }
}
