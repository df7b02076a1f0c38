use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client as ReqwestClient;
use retrykit_common::OutcomeClassifier;
use retrykit_core::Upstream;
use retrykit_domain::{RetryKitError, UpstreamConfig, UpstreamFailure, UpstreamReply};
use tracing::debug;

use super::classify::{HttpOutcomeClassifier, RawResponse};
use crate::errors::InfraError;

/// HTTP client for the flaky upstream.
///
/// Every call is a single exchange. Retrying belongs to the scenario that
/// issued the call, so the client never repeats a request on its own.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    classifier: HttpOutcomeClassifier,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client for the upstream described by `config`.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, RetryKitError> {
        let mut builder =
            Self::builder().base_url(&config.base_url).user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path` under the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST an empty body to `path` once and classify the result.
    pub async fn post(&self, path: &str) -> Result<UpstreamReply, UpstreamFailure> {
        let url = self.url_for(path);
        debug!(%url, "sending HTTP request");

        let raw = self.exchange(&url).await;
        match &raw {
            Ok(response) => debug!(%url, status = response.status, "received HTTP response"),
            Err(err) => debug!(%url, error = %err, "HTTP request failed"),
        }

        self.classifier.classify(raw).into_result()
    }

    async fn exchange(&self, url: &str) -> Result<RawResponse, reqwest::Error> {
        let response = self.client.post(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Upstream for HttpClient {
    async fn post(&self, path: &str) -> Result<UpstreamReply, UpstreamFailure> {
        HttpClient::post(self, path).await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl HttpClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Whole-request timeout. Unset means requests wait indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, RetryKitError> {
        let base_url = self
            .base_url
            .ok_or_else(|| RetryKitError::Config("HTTP client requires a base URL".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RetryKitError::Config(format!(
                "base URL must be http(s), got {base_url}"
            )));
        }

        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| RetryKitError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, base_url, classifier: HttpOutcomeClassifier })
    }
}
