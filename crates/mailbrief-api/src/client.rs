//! HTTP client for the triage backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mailbrief_core::{
    Error, FilterPredicate, Listing, MailboxClient, MailboxStats, ReportClient, ReportPayload,
    Result, StatsClient, SummariesClient, SyncRequest, SyncResponse,
};
use tracing::debug;
use url::Url;

use crate::wire::{
    ReportRequestDto, SyncRequestDto, parse_listing, parse_report, parse_stats, parse_sync,
    summary_query_pairs,
};

const SUMMARIES_PATH: &str = "emails/summaries";
const STATS_PATH: &str = "emails/summaries/stats";
const SYNC_PATH: &str = "emails/fetch/gmail";
const REPORT_PATH: &str = "reports/summary";

/// Builder for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set a request timeout.
    ///
    /// The backend contract specifies no timeout or retry policy, so this
    /// stays optional transport configuration; by default requests may
    /// wait indefinitely.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the base URL is invalid or the
    /// underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient> {
        // A trailing slash makes Url::join treat the base as a directory.
        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .map_err(|err| Error::Config(format!("invalid base URL {base_url:?}: {err}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| Error::Config(err.to_string()))?;

        Ok(ApiClient { http, base })
    }
}

/// REST implementation of the core's collaborator traits.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the base URL is invalid.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Create a configurable builder.
    #[must_use]
    pub fn builder(base_url: &str) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.to_string(),
            timeout: None,
        }
    }

    /// Wrap the client for sharing across session components.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|err| Error::Config(format!("invalid endpoint {path:?}: {err}")))
    }

    async fn read_body(response: reqwest::Response) -> Result<(u16, Vec<u8>)> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        Ok((status, body.to_vec()))
    }
}

impl SummariesClient for ApiClient {
    async fn list_summaries(&self, filter: &FilterPredicate) -> Result<Listing> {
        let url = self.endpoint(SUMMARIES_PATH)?;
        let pairs = summary_query_pairs(filter, Utc::now().timestamp_millis());
        debug!(%url, "listing summaries");

        let response = self
            .http
            .get(url)
            .query(&pairs)
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let (status, body) = Self::read_body(response).await?;
        parse_listing(status, &body)
    }
}

impl MailboxClient for ApiClient {
    async fn sync_mailbox(&self, request: &SyncRequest) -> Result<SyncResponse> {
        let url = self.endpoint(SYNC_PATH)?;
        debug!(%url, continuing = request.page_token.is_some(), "syncing mailbox");

        let response = self
            .http
            .post(url)
            .json(&SyncRequestDto::from(request))
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let (status, body) = Self::read_body(response).await?;
        parse_sync(status, &body)
    }
}

impl ReportClient for ApiClient {
    async fn generate_report(&self, filter: &FilterPredicate) -> Result<ReportPayload> {
        let url = self.endpoint(REPORT_PATH)?;
        debug!(%url, "generating report");

        let response = self
            .http
            .post(url)
            .json(&ReportRequestDto::from(filter))
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let (status, body) = Self::read_body(response).await?;
        parse_report(status, &body)
    }
}

impl StatsClient for ApiClient {
    async fn fetch_stats(&self) -> Result<MailboxStats> {
        let url = self.endpoint(STATS_PATH)?;
        debug!(%url, "fetching stats");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let (status, body) = Self::read_body(response).await?;
        parse_stats(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let err = ApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/api").unwrap();
        let url = client.endpoint(SUMMARIES_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/emails/summaries");
    }

    #[test]
    fn test_endpoint_paths() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        for (path, expected) in [
            (SUMMARIES_PATH, "http://localhost:8000/emails/summaries"),
            (STATS_PATH, "http://localhost:8000/emails/summaries/stats"),
            (SYNC_PATH, "http://localhost:8000/emails/fetch/gmail"),
            (REPORT_PATH, "http://localhost:8000/reports/summary"),
        ] {
            assert_eq!(client.endpoint(path).unwrap().as_str(), expected);
        }
    }
}
