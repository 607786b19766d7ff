//! Record source access
//!
//! [`RecordSource`] is the injected boundary to whatever serves player
//! records; [`HttpRecordSource`] is the production implementation talking to
//! the `top_players` HTTP endpoint. [`DataFetcher`] wraps a source with
//! logging and is what the controller holds.
//!
//! No retries happen at this layer. A failed fetch is returned to the caller,
//! and the next filter action naturally issues a new request.

use crate::query::QueryParams;
use crate::record::{parse_records, Record};
use async_trait::async_trait;
use mpg_common::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("mpg-chart/", env!("CARGO_PKG_VERSION"));

/// Record source errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    NetworkFailure(String),

    /// Body was not a JSON array of record objects
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No complete answer within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Record source answered with a non-success status
    #[error("Record source rejected query ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Anything able to answer a records query
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Issue exactly one request for `query`
    async fn fetch_records(&self, query: &QueryParams) -> Result<Vec<Record>, FetchError>;
}

/// Record source over HTTP
pub struct HttpRecordSource {
    http_client: reqwest::Client,
    endpoint_url: String,
    timeout: Duration,
}

impl HttpRecordSource {
    /// Create client for the resolved endpoint
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint_url: config.endpoint_url(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn map_transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::NetworkFailure(err.to_string())
        }
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_records(&self, query: &QueryParams) -> Result<Vec<Record>, FetchError> {
        let response = self
            .http_client
            .get(&self.endpoint_url)
            .query(query.pairs())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        parse_records(&body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }
}

/// Logged handle to a record source, cheap to clone
#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn RecordSource>,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// Fetch the records selected by `query`
    pub async fn fetch(&self, query: &QueryParams) -> Result<Vec<Record>, FetchError> {
        tracing::debug!(query = %query, "Fetching records");

        match self.source.fetch_records(query).await {
            Ok(records) => {
                tracing::info!(query = %query, records = records.len(), "Records fetched");
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Record fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterState;
    use crate::query::serialize;

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch_records(&self, _query: &QueryParams) -> Result<Vec<Record>, FetchError> {
            Err(FetchError::Timeout(Duration::from_millis(5)))
        }
    }

    #[test]
    fn test_client_creation() {
        let source = HttpRecordSource::new(&ClientConfig::default()).unwrap();
        assert_eq!(source.endpoint_url(), "http://localhost:5001/top_players");
    }

    #[tokio::test]
    async fn test_fetcher_passes_errors_through() {
        let fetcher = DataFetcher::new(Arc::new(FailingSource));
        let err = fetcher.fetch(&serialize(&FilterState::new())).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout(Duration::from_millis(5)));
    }

    #[test]
    fn test_rejected_message_includes_status() {
        let err = FetchError::Rejected {
            status: 403,
            message: "top_number arg must be defined".to_string(),
        };
        assert!(err.to_string().contains("403"));
    }
}
