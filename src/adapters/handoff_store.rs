use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{DomainError, TriageResult};
use crate::ports::HandoffStore;

const HANDOFF_FILE: &str = "triage_result.json";

/// JSON-file handoff store.
///
/// The successful triage payload is written verbatim to a single file in
/// the data directory; the results surface reads it from there.
pub struct JsonHandoffStore {
    path: PathBuf,
}

impl JsonHandoffStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(HANDOFF_FILE),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl HandoffStore for JsonHandoffStore {
    fn save_result(&self, result: &TriageResult) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(result.as_value())?;
        fs::write(&self.path, content)?;

        info!(path = ?self.path, "Triage result handed off");
        Ok(())
    }

    fn load_result(&self) -> Result<Option<TriageResult>, DomainError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        debug!(path = ?self.path, "Triage result read back");
        Ok(Some(TriageResult::from_value(value)))
    }

    fn clear(&self) -> Result<(), DomainError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
