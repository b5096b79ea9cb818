//! Discovery provider calling the REST discovery service.
//!
//! Issues `GET {endpoint}/services` with the caller's bearer token and turns
//! the listed services into discovery records.

use discovery_record::Records;

mod services;

pub use services::{ParseError, parse as parse_services};

/// Errors returned while discovering capabilities over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Sending the request or reading the response failed.
    #[error("discovery request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The service responded with a non-success status.
    #[error("discovery service responded with status {status}")]
    Status {
        /// The response status.
        status: reqwest::StatusCode,
    },

    /// The response body could not be parsed.
    #[error("malformed discovery response: {0}")]
    Parse(#[source] ParseError),
}

/// Discovery provider backed by the REST discovery service.
#[derive(Debug, Clone)]
pub struct HttpDiscoveryProvider {
    /// The HTTP client to send requests with.
    http_client: reqwest::Client,

    /// The `services` collection URL.
    services_url: url::Url,
}

impl HttpDiscoveryProvider {
    /// Create a provider for the discovery service rooted at `endpoint`.
    pub fn new(
        http_client: reqwest::Client,
        endpoint: &url::Url,
    ) -> Result<Self, url::ParseError> {
        let services_url = services_url(endpoint)?;
        Ok(Self {
            http_client,
            services_url,
        })
    }

    /// The URL the provider fetches services from.
    pub fn services_url(&self) -> &url::Url {
        &self.services_url
    }
}

/// Resolve the `services` collection under the discovery endpoint.
fn services_url(endpoint: &url::Url) -> Result<url::Url, url::ParseError> {
    if endpoint.path().ends_with('/') {
        return endpoint.join("services");
    }

    let mut base = endpoint.clone();
    base.set_path(&format!("{}/", endpoint.path()));
    base.join("services")
}

impl discovery_provider_core::DiscoveryProvider for HttpDiscoveryProvider {
    type Error = Error;

    async fn discover_all<'a>(&'a self, access_token: &'a str) -> Result<Records, Self::Error> {
        tracing::debug!(services_url = %self.services_url, "requesting capability discovery");

        let response = self
            .http_client
            .get(self.services_url.clone())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(Error::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        let body = response.bytes().await.map_err(Error::Request)?;
        let records = services::parse(&body).map_err(Error::Parse)?;

        tracing::debug!(records = records.len(), "capability discovery succeeded");

        Ok(records)
    }
}
