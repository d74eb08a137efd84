use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{Coordinates, DomainError};

/// The shared symptom text field.
///
/// The voice component writes into it and the submission flow reads from
/// it; the two never call each other. Owned by the controller, handed
/// out by clone.
#[derive(Clone, Default)]
pub struct SymptomField(Arc<RwLock<String>>);

impl SymptomField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.0.write() = text.into();
    }

    pub fn get(&self) -> String {
        self.0.read().clone()
    }

    pub fn trimmed(&self) -> String {
        self.0.read().trim().to_string()
    }

    pub fn clear(&self) {
        self.0.write().clear();
    }
}

/// The page's single owned position estimate.
///
/// Written by a geolocation query (or its fallback policy), read at
/// submit time. None until a query has completed.
#[derive(Clone, Default)]
pub struct LocationEstimate(Arc<RwLock<Option<Coordinates>>>);

impl LocationEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Coordinates> {
        *self.0.read()
    }

    pub fn set(&self, coords: Coordinates) {
        *self.0.write() = Some(coords);
    }
}

/// Loading indicator for the submission flow.
///
/// True only between request start and settle. The guard releases it on
/// drop, so every exit path, including panics and early returns, shows
/// the indicator hidden again. Acquiring while held rejects the second
/// submission instead of letting two requests overlap.
#[derive(Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn acquire(&self) -> Result<LoadingGuard, DomainError> {
        if self
            .0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DomainError::SubmissionInFlight);
        }
        Ok(LoadingGuard(Arc::clone(&self.0)))
    }
}

#[derive(Debug)]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
