use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::models::{AssignmentMap, BackendSnapshot, SwapRecord};
use crate::error::{Result, RosterError};

/// Read/write contract every persistence backend fulfils.
///
/// Writes are best-effort: callers log failures and carry on with the
/// in-memory state. A backend only implements the write that fits its shape.
#[async_trait]
pub trait RosterBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<BackendSnapshot>;

    /// Push the whole date -> role mapping
    async fn store_assignments(&self, _assignments: &AssignmentMap) -> Result<()> {
        Ok(())
    }

    /// Push one applied swap
    async fn submit_swap(&self, _record: &SwapRecord) -> Result<()> {
        Ok(())
    }
}

/// Process-local backend. Keeps whichever snapshot shape it was created with.
pub struct MemoryBackend {
    snapshot: Mutex<BackendSnapshot>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_snapshot(BackendSnapshot::Mapping(AssignmentMap::new()))
    }

    pub fn with_snapshot(snapshot: BackendSnapshot) -> Self {
        Self { snapshot: Mutex::new(snapshot) }
    }

    pub fn snapshot(&self) -> Result<BackendSnapshot> {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .map_err(|e| RosterError::BackendUnavailable(e.to_string()))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self) -> Result<BackendSnapshot> {
        self.snapshot()
    }

    async fn store_assignments(&self, assignments: &AssignmentMap) -> Result<()> {
        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|e| RosterError::BackendUnavailable(e.to_string()))?;
        if let BackendSnapshot::Mapping(stored) = &mut *snapshot {
            *stored = assignments.clone();
        }
        Ok(())
    }

    async fn submit_swap(&self, record: &SwapRecord) -> Result<()> {
        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|e| RosterError::BackendUnavailable(e.to_string()))?;
        if let BackendSnapshot::RecordList(records) = &mut *snapshot {
            records.push(record.clone());
        }
        Ok(())
    }
}
