use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::domain::DomainError;
use crate::ports::{HttpClient, HttpResponse};

/// reqwest-backed HTTP client.
///
/// Requests are restricted to the hosts the configuration names (the
/// triage backend and the geolocation provider); anything else is
/// refused before a connection is attempted. An empty host list allows
/// everything.
pub struct ReqwestHttpClient {
    client: Client,
    allowed_hosts: Vec<String>,
}

impl ReqwestHttpClient {
    pub fn new(allowed_hosts: Vec<String>) -> Result<Self, DomainError> {
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("triage-intake/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::HttpRequest(format!("Failed to create HTTP client: {e}")))?;

        debug!(allowed_hosts = ?allowed_hosts, "HTTP client initialized");

        Ok(Self {
            client,
            allowed_hosts,
        })
    }

    /// Extract the host of a URL, for building the allow list.
    pub fn host_of(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    fn is_url_allowed(&self, url: &str) -> Result<(), DomainError> {
        if self.allowed_hosts.is_empty() {
            return Ok(());
        }

        let parsed = Url::parse(url).map_err(|e| DomainError::HttpRequest(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| DomainError::HttpRequest("Invalid URL: no host".to_string()))?;

        if !self
            .allowed_hosts
            .iter()
            .any(|h| host == h || host.ends_with(&format!(".{h}")))
        {
            warn!(url, host, "Request refused: host not in configured set");
            return Err(DomainError::NetworkBlocked {
                reason: format!("Host '{host}' is not a configured endpoint"),
            });
        }
        Ok(())
    }

    async fn settle(response: reqwest::Response) -> Result<HttpResponse, DomainError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, DomainError> {
        self.is_url_allowed(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))?;

        Self::settle(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, DomainError> {
        self.is_url_allowed(url)?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))?;

        Self::settle(response).await
    }
}
