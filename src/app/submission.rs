use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::domain::{BackendHealth, DomainError, SymptomReport, TriageResult};
use crate::ports::HttpClient;

/// Gateway to the remote triage service.
///
/// One submit call is exactly one POST. Success means a 2xx status AND a
/// payload without an embedded "error" field; everything else is a
/// backend failure carrying whatever detail the payload offered.
pub struct TriageGateway {
    http: Arc<dyn HttpClient>,
    triage_url: String,
    health_url: String,
}

impl TriageGateway {
    pub fn new(http: Arc<dyn HttpClient>, base_url: &str) -> Result<Self, DomainError> {
        let base = Url::parse(base_url)
            .map_err(|e| DomainError::Config(format!("invalid backend base URL: {e}")))?;

        let join = |path: &str| {
            base.join(path)
                .map(|u| u.to_string())
                .map_err(|e| DomainError::Config(format!("invalid backend base URL: {e}")))
        };

        Ok(Self {
            http,
            triage_url: join("/triage")?,
            health_url: join("/health")?,
        })
    }

    pub async fn submit(&self, report: &SymptomReport) -> Result<TriageResult, DomainError> {
        let body = serde_json::to_value(report)?;

        info!(
            symptoms_len = report.symptoms.len(),
            language = report.language.code(),
            has_location = report.location.is_some(),
            "Submitting symptom report"
        );

        let response = self.http.post_json(&self.triage_url, &body).await?;

        let payload: serde_json::Value = match serde_json::from_str(&response.body) {
            Ok(value) => value,
            Err(_) => {
                warn!(status = response.status, "Unreadable triage response");
                return Err(DomainError::Backend { detail: None });
            }
        };

        let detail = payload
            .get("error")
            .and_then(|e| e.as_str())
            .map(String::from);

        if !response.is_success() || detail.is_some() {
            warn!(status = response.status, detail = ?detail, "Triage request failed");
            return Err(DomainError::Backend { detail });
        }

        info!(status = response.status, "Triage request succeeded");
        Ok(TriageResult::from_value(payload))
    }

    /// Probe the backend's health endpoint.
    pub async fn health(&self) -> Result<BackendHealth, DomainError> {
        let response = self.http.get(&self.health_url).await?;

        if !response.is_success() {
            return Err(DomainError::Backend { detail: None });
        }

        Ok(serde_json::from_str(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::MockHttpClient;
    use crate::domain::Language;
    use crate::ports::HttpResponse;

    fn report() -> SymptomReport {
        SymptomReport::new("fever and headache", Language::En, false, None).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_payload_verbatim() {
        let http = Arc::new(MockHttpClient::new());
        http.push_response(HttpResponse {
            status: 200,
            body: r#"{"success":true,"severity":"Self-care","advice":"Rest"}"#.to_string(),
        });

        let gateway = TriageGateway::new(http.clone(), "http://localhost:5000").unwrap();
        let result = gateway.submit(&report()).await.unwrap();

        assert_eq!(result.severity(), Some("Self-care"));
        assert_eq!(
            result.as_value(),
            &serde_json::json!({"success": true, "severity": "Self-care", "advice": "Rest"})
        );
    }

    #[tokio::test]
    async fn test_request_body_matches_report() {
        let http = Arc::new(MockHttpClient::new());
        http.push_response(HttpResponse {
            status: 200,
            body: "{}".to_string(),
        });

        let gateway = TriageGateway::new(http.clone(), "http://localhost:5000").unwrap();
        let report =
            SymptomReport::new("  chest pain  ", Language::Hi, true, None).unwrap();
        gateway.submit(&report).await.unwrap();

        let posts = http.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "http://localhost:5000/triage");
        assert_eq!(
            posts[0].1,
            serde_json::json!({
                "symptoms": "chest pain",
                "language": "hi",
                "ayushman_card": true,
                "location": null,
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_surfaces_backend_detail() {
        let http = Arc::new(MockHttpClient::new());
        http.push_response(HttpResponse {
            status: 500,
            body: r#"{"error":"Analysis failed","details":"model overloaded"}"#.to_string(),
        });

        let gateway = TriageGateway::new(http.clone(), "http://localhost:5000").unwrap();
        let err = gateway.submit(&report()).await.unwrap_err();

        assert_eq!(err.backend_detail(), Some("Analysis failed"));
    }

    #[tokio::test]
    async fn test_embedded_error_fails_even_with_200() {
        let http = Arc::new(MockHttpClient::new());
        http.push_response(HttpResponse {
            status: 200,
            body: r#"{"error":"Symptoms are required"}"#.to_string(),
        });

        let gateway = TriageGateway::new(http.clone(), "http://localhost:5000").unwrap();
        let err = gateway.submit(&report()).await.unwrap_err();

        assert_eq!(err.backend_detail(), Some("Symptoms are required"));
    }

    #[tokio::test]
    async fn test_error_status_without_detail_is_generic() {
        let http = Arc::new(MockHttpClient::new());
        http.push_response(HttpResponse {
            status: 502,
            body: "Bad Gateway".to_string(),
        });

        let gateway = TriageGateway::new(http.clone(), "http://localhost:5000").unwrap();
        let err = gateway.submit(&report()).await.unwrap_err();

        assert!(matches!(err, DomainError::Backend { detail: None }));
        assert!(err.to_string().contains("Analysis failed"));
    }

    #[tokio::test]
    async fn test_health_probe() {
        let http = Arc::new(MockHttpClient::new());
        http.push_response(HttpResponse {
            status: 200,
            body: r#"{"status":"healthy","service":"Triage Backend"}"#.to_string(),
        });

        let gateway = TriageGateway::new(http.clone(), "http://localhost:5000").unwrap();
        let health = gateway.health().await.unwrap();

        assert_eq!(health.status, "healthy");
        assert_eq!(health.service.as_deref(), Some("Triage Backend"));
    }

    #[test]
    fn test_invalid_base_url_is_a_config_error() {
        let http = Arc::new(MockHttpClient::new());
        let err = TriageGateway::new(http, "not a url").err().unwrap();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
