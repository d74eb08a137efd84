use async_trait::async_trait;

use crate::domain::{Coordinates, DomainError};

/// Geolocation port.
///
/// Implementations answer with the device's current position, honor a
/// client-side timeout, and may serve a cached answer within a freshness
/// bound. Substituting a fallback position on failure is the caller's
/// policy, not the port's.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, DomainError>;
}
