use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::config::GeolocationConfig;
use crate::domain::{Coordinates, DomainError};
use crate::ports::{Geolocator, HttpClient};

/// Position estimate from an IP-geolocation provider.
///
/// Carries the client-side timeout and the freshness bound itself: a
/// cached answer younger than `max_age` is served without a new query,
/// and a query that does not settle within `timeout` fails.
pub struct IpGeolocator {
    http: Arc<dyn HttpClient>,
    provider_url: String,
    timeout: Duration,
    max_age: Duration,
    cached: Mutex<Option<(Coordinates, Instant)>>,
}

/// Wire shape of the provider's answer. ip-api.com says `lon`; other
/// providers say `lng`, so both spellings are accepted.
#[derive(Deserialize)]
struct ProviderAnswer {
    lat: f64,
    #[serde(alias = "lng")]
    lon: f64,
}

impl IpGeolocator {
    pub fn new(http: Arc<dyn HttpClient>, config: &GeolocationConfig) -> Self {
        Self {
            http,
            provider_url: config.provider_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_age: Duration::from_secs(config.max_age_secs),
            cached: Mutex::new(None),
        }
    }

    async fn query_provider(&self) -> Result<Coordinates, DomainError> {
        let response = self
            .http
            .get(&self.provider_url)
            .await
            .map_err(|e| DomainError::Geolocation(e.to_string()))?;

        if !response.is_success() {
            return Err(DomainError::Geolocation(format!(
                "provider answered HTTP {}",
                response.status
            )));
        }

        let answer: ProviderAnswer = serde_json::from_str(&response.body)
            .map_err(|e| DomainError::Geolocation(format!("unreadable provider answer: {e}")))?;

        Ok(Coordinates {
            lat: answer.lat,
            lng: answer.lon,
        })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, DomainError> {
        if let Some((coords, at)) = *self.cached.lock() {
            if at.elapsed() < self.max_age {
                debug!(age_secs = at.elapsed().as_secs(), "Serving cached position");
                return Ok(coords);
            }
        }

        let coords = match tokio::time::timeout(self.timeout, self.query_provider()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Position query timed out");
                return Err(DomainError::Geolocation("position query timed out".to_string()));
            }
        };

        *self.cached.lock() = Some((coords, Instant::now()));
        info!(lat = coords.lat, lng = coords.lng, "Position obtained");
        Ok(coords)
    }
}
