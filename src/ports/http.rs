use async_trait::async_trait;

use crate::domain::DomainError;

/// Transport-level view of a settled HTTP exchange. Whether a non-2xx
/// status or an embedded error field counts as failure is policy, and
/// policy lives with the caller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, DomainError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client port. All network traffic goes through this interface.
///
/// Errors are transport-level only (connection, TLS, blocked host); a
/// response with an error status still settles as `Ok`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse, DomainError>;

    /// Perform a POST request with a JSON body.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = HttpResponse {
            status: 200,
            body: String::new(),
        };
        assert!(ok.is_success());

        let created = HttpResponse {
            status: 201,
            body: String::new(),
        };
        assert!(created.is_success());

        let bad = HttpResponse {
            status: 500,
            body: String::new(),
        };
        assert!(!bad.is_success());
    }
}
