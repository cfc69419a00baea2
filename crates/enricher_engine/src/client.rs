use std::time::Duration;

use enricher_core::{EnrichmentResult, FailureKind, FetchError};
use enricher_logging::enrich_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::wire::{EnrichRequest, EnrichResponse};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    /// `None` leaves connection setup unbounded.
    pub connect_timeout: Option<Duration>,
    /// `None` leaves the whole request unbounded; only cancellation ends it.
    pub request_timeout: Option<Duration>,
    pub max_bytes: u64,
}

impl ClientSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: None,
            request_timeout: None,
            max_bytes: 256 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid enrichment endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Boundary to the external enrichment source.
///
/// Implementations should stop work and return a `Cancelled` error once
/// `cancel` fires. Results of requests that keep running anyway are discarded
/// by the pipeline.
#[async_trait::async_trait]
pub trait EnrichmentClient: Send + Sync {
    async fn fetch(
        &self,
        trigger_value: &str,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentResult, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestEnrichmentClient {
    endpoint: Url,
    max_bytes: u64,
    client: reqwest::Client,
}

impl ReqwestEnrichmentClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientBuildError> {
        let endpoint =
            Url::parse(&settings.endpoint).map_err(|source| ClientBuildError::InvalidEndpoint {
                endpoint: settings.endpoint.clone(),
                source,
            })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint,
            max_bytes: settings.max_bytes,
            client: builder.build()?,
        })
    }

    async fn post(&self, trigger_value: &str) -> Result<EnrichmentResult, FetchError> {
        let body = serde_json::to_vec(&EnrichRequest { trigger_value })
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // The error body is best effort; a missing or broken one falls back.
            let message = self
                .read_body(response)
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice::<EnrichResponse>(&bytes).ok())
                .and_then(|body| body.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback_message(status));
            enrich_debug!("Enrichment endpoint answered {}", status);
            return Ok(EnrichmentResult::failed(Some(message)));
        }

        let bytes = self.read_body(response).await?;
        let body: EnrichResponse = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        Ok(body.into_result())
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(too_large(self.max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(too_large(self.max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl EnrichmentClient for ReqwestEnrichmentClient {
    async fn fetch(
        &self,
        trigger_value: &str,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentResult, FetchError> {
        // Dropping the request future aborts the connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::cancelled()),
            result = self.post(trigger_value) => result,
        }
    }
}

fn fallback_message(status: StatusCode) -> String {
    format!("Enrichment service returned {status}")
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
