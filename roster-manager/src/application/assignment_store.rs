use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use crate::domain::calendar_logic::{generate_month, preload_month, PreloadMode};
use crate::domain::models::{AssignmentMap, BackendSnapshot, MonthCursor, Rotation, SwapRecord};
use crate::domain::swap_engine::apply_exchange;
use crate::error::Result;
use crate::infrastructure::repository::RosterBackend;

/// Identifies which navigation state a load was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorTicket {
    pub epoch: u64,
    pub cursor: MonthCursor,
}

/// A finished backend read, still tagged with the ticket it was started with
#[derive(Debug)]
pub struct LoadResponse {
    pub ticket: CursorTicket,
    pub outcome: Result<BackendSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A mapping replaced the in-memory map
    Replaced { entries: usize },
    /// Records were replayed onto freshly generated defaults
    Reconciled { records: usize },
    /// The backend failed; defaults were generated for the cursor month
    FellBack,
    /// The user navigated away before the response arrived; ignored
    Stale,
}

/// In-memory assignments plus best-effort sync with one backend.
/// The in-memory map is the source of truth for the running session.
pub struct AssignmentStore {
    backend: Arc<dyn RosterBackend>,
    rotation: Rotation,
    assignments: AssignmentMap,
}

impl AssignmentStore {
    pub fn new(backend: Arc<dyn RosterBackend>, rotation: Rotation) -> Self {
        Self {
            backend,
            rotation,
            assignments: AssignmentMap::new(),
        }
    }

    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    pub fn assignments_mut(&mut self) -> &mut AssignmentMap {
        &mut self.assignments
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Starts a backend read. The future does not borrow the store, so the
    /// session stays usable (navigation, proposals) while it is outstanding.
    pub fn fetch(&self, ticket: CursorTicket) -> impl Future<Output = LoadResponse> + Send + 'static {
        let backend = Arc::clone(&self.backend);
        async move {
            let outcome = backend.fetch().await;
            LoadResponse { ticket, outcome }
        }
    }

    /// Commits a finished read unless it was started for an older ticket
    pub fn apply(&mut self, response: LoadResponse, current: CursorTicket) -> LoadStatus {
        if response.ticket != current {
            log::debug!(
                "discarding stale load for {} (epoch {}, now {})",
                response.ticket.cursor,
                response.ticket.epoch,
                current.epoch
            );
            return LoadStatus::Stale;
        }

        match response.outcome {
            Ok(BackendSnapshot::Mapping(assignments)) => {
                let entries = assignments.len();
                self.assignments = assignments;
                log::info!("loaded {} assignments from {}", entries, self.backend.name());
                LoadStatus::Replaced { entries }
            }
            Ok(BackendSnapshot::RecordList(records)) => {
                self.assignments = generate_month(current.cursor, &self.rotation);
                // every month a record touches starts from its own defaults
                let touched: BTreeSet<MonthCursor> = records
                    .iter()
                    .flat_map(|r| [MonthCursor::containing(&r.from), MonthCursor::containing(&r.to)])
                    .collect();
                for cursor in touched {
                    self.preload(cursor, PreloadMode::FillGaps);
                }
                let replayed = self.reconcile(&records);
                log::info!("replayed {} swaps from {}", replayed, self.backend.name());
                LoadStatus::Reconciled { records: replayed }
            }
            Err(e) => {
                if e.is_backend_failure() {
                    log::warn!(
                        "{} backend failed ({}), using generated defaults for {}",
                        self.backend.name(),
                        e,
                        current.cursor
                    );
                } else {
                    log::error!("{} backend: {}", self.backend.name(), e);
                }
                self.preload(current.cursor, PreloadMode::FillGaps);
                LoadStatus::FellBack
            }
        }
    }

    pub async fn load(&mut self, ticket: CursorTicket) -> LoadStatus {
        let response = self.fetch(ticket).await;
        self.apply(response, ticket)
    }

    pub fn preload(&mut self, cursor: MonthCursor, mode: PreloadMode) -> usize {
        preload_month(&mut self.assignments, cursor, &self.rotation, mode)
    }

    /// Replays swaps committed elsewhere, in the order given. Last write wins.
    pub fn reconcile(&mut self, records: &[SwapRecord]) -> usize {
        for record in records {
            apply_exchange(
                &mut self.assignments,
                record.from,
                record.to,
                &record.person,
                record.swapped_with.as_ref(),
            );
        }
        records.len()
    }

    /// Pushes the current state; `change` is the swap that caused the write.
    /// Failures are logged and never undo the in-memory change.
    pub async fn save(&self, change: Option<&SwapRecord>) -> bool {
        let mut persisted = true;

        if let Err(e) = self.backend.store_assignments(&self.assignments).await {
            log::warn!("{}: failed to store assignments: {}", self.backend.name(), e);
            persisted = false;
        }
        if let Some(record) = change {
            if let Err(e) = self.backend.submit_swap(record).await {
                log::warn!("{}: failed to submit swap: {}", self.backend.name(), e);
                persisted = false;
            }
        }
        persisted
    }
}
