use crate::domain::{DomainError, TriageResult};

/// Handoff store port: the persisted key a separate results surface reads
/// the successful triage payload from. Written verbatim, consumed out of
/// scope.
pub trait HandoffStore: Send + Sync {
    /// Persist a successful triage result, replacing any previous one.
    fn save_result(&self, result: &TriageResult) -> Result<(), DomainError>;

    /// Read back the last persisted result, if any.
    fn load_result(&self) -> Result<Option<TriageResult>, DomainError>;

    /// Remove the persisted result.
    fn clear(&self) -> Result<(), DomainError>;
}
