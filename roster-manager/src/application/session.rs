use std::future::Future;
use std::sync::Arc;

use crate::application::assignment_store::{AssignmentStore, CursorTicket, LoadResponse, LoadStatus};
use crate::application::time::now_local;
use crate::domain::calendar_logic::PreloadMode;
use crate::domain::models::{AssignmentMap, DateKey, MonthCursor, Role, Rotation};
use crate::domain::swap_engine::{SwapEngine, SwapPolicy, SwapRequest};
use crate::domain::swap_history::{SwapHistory, SwapHistoryEntry};
use crate::error::{Result, RosterError};
use crate::infrastructure::repository::RosterBackend;

/// Everything one user session owns: month cursor, selected role,
/// assignments (through the store), the pending swap and the swap log.
pub struct RosterSession {
    rotation: Rotation,
    cursor: MonthCursor,
    epoch: u64,
    selected_role: Role,
    store: AssignmentStore,
    engine: SwapEngine,
    history: SwapHistory,
}

impl RosterSession {
    /// Starts on `cursor` with that month already materialized from defaults
    pub fn new(
        backend: Arc<dyn RosterBackend>,
        rotation: Rotation,
        policy: SwapPolicy,
        cursor: MonthCursor,
    ) -> Self {
        let mut store = AssignmentStore::new(backend, rotation.clone());
        store.preload(cursor, PreloadMode::FillGaps);

        Self {
            selected_role: rotation.role_at(0).clone(),
            rotation,
            cursor,
            epoch: 0,
            store,
            engine: SwapEngine::new(policy),
            history: SwapHistory::new(),
        }
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn ticket(&self) -> CursorTicket {
        CursorTicket { epoch: self.epoch, cursor: self.cursor }
    }

    pub fn assignments(&self) -> &AssignmentMap {
        self.store.assignments()
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn engine(&self) -> &SwapEngine {
        &self.engine
    }

    pub fn history(&self) -> &SwapHistory {
        &self.history
    }

    pub fn selected_role(&self) -> &Role {
        &self.selected_role
    }

    // =====================
    // Loading
    // =====================

    /// Starts a load for the current ticket without holding the session
    pub fn begin_load(&self) -> impl Future<Output = LoadResponse> + Send + 'static {
        self.store.fetch(self.ticket())
    }

    /// Commits a load; responses for an older ticket are dropped
    pub fn finish_load(&mut self, response: LoadResponse) -> LoadStatus {
        let status = self.store.apply(response, self.ticket());
        if status != LoadStatus::Stale {
            // a stored mapping may not cover the month on screen yet
            self.store.preload(self.cursor, PreloadMode::FillGaps);
        }
        status
    }

    pub async fn load(&mut self) -> LoadStatus {
        let response = self.begin_load().await;
        self.finish_load(response)
    }

    // =====================
    // Navigation
    // =====================

    /// Moves the cursor and materializes the new month (gaps only).
    /// Any load still in flight becomes stale.
    pub fn navigate(&mut self, offset: i32) -> MonthCursor {
        self.cursor = self.cursor.offset(offset);
        self.epoch += 1;
        self.store.preload(self.cursor, PreloadMode::FillGaps);
        self.cursor
    }

    /// Regenerates the current month from scratch and saves it
    pub async fn reset_month(&mut self) -> usize {
        let filled = self.store.preload(self.cursor, PreloadMode::Reset);
        self.store.save(None).await;
        filled
    }

    pub fn select_role(&mut self, name: &str) -> Result<&Role> {
        let role = self
            .rotation
            .find(name)
            .cloned()
            .ok_or_else(|| RosterError::UnknownRole(name.trim().to_string()))?;
        self.selected_role = role;
        Ok(&self.selected_role)
    }

    // =====================
    // Swaps
    // =====================

    /// Validates a swap for the selected role and holds it pending.
    /// The destination month is materialized first so a weekday there
    /// is never mistaken for an empty date.
    pub fn propose_swap(
        &mut self,
        from: Option<DateKey>,
        to: Option<DateKey>,
        acknowledged: bool,
    ) -> Result<SwapRequest> {
        if let Some(to) = &to {
            self.store.preload(MonthCursor::containing(to), PreloadMode::FillGaps);
        }
        self.engine.propose(
            self.store.assignments(),
            from,
            to,
            &self.selected_role,
            acknowledged,
        )
    }

    /// Applies the pending swap, logs it, then saves (best-effort)
    pub async fn confirm_swap(&mut self) -> Result<SwapHistoryEntry> {
        let entry = self.engine.confirm(
            self.store.assignments_mut(),
            &mut self.history,
            now_local(),
        )?;
        let record = self.engine.policy().record_for(&entry);
        self.store.save(Some(&record)).await;
        Ok(entry)
    }

    pub fn cancel_swap(&mut self) -> Result<SwapRequest> {
        self.engine.cancel()
    }

    pub fn export_history(&self) -> Vec<String> {
        self.history.export()
    }
}
