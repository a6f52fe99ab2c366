use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use roster_manager_lib::{
    domain::models::{AssignmentMap, BackendSnapshot, SwapRecord},
    infrastructure::repository::RosterBackend,
    Result, RosterError,
};

/// Backend that is never reachable. Counts the attempted writes.
#[derive(Default)]
pub struct UnreachableBackend {
    pub writes: AtomicUsize,
}

impl UnreachableBackend {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterBackend for UnreachableBackend {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn fetch(&self) -> Result<BackendSnapshot> {
        Err(RosterError::BackendUnavailable("connection refused".to_string()))
    }

    async fn store_assignments(&self, _assignments: &AssignmentMap) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(RosterError::BackendUnavailable("connection refused".to_string()))
    }

    async fn submit_swap(&self, _record: &SwapRecord) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(RosterError::BackendUnavailable("connection refused".to_string()))
    }
}
