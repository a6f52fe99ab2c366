use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::models::{AssignmentMap, DateKey, Role, SwapRecord};
use crate::domain::swap_history::{SwapHistory, SwapHistoryEntry};
use crate::error::{Result, RosterError};

/// A validated swap waiting for the user to say yes or no
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub from: DateKey,
    pub to: DateKey,
    pub requesting_role: Role,
    /// Role on `to` at validation time, `None` for an empty (e.g. weekend) date
    pub counterparty_role: Option<Role>,
}

/// How a confirmed swap rewrites the two dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPolicy {
    /// `to` gets the requesting role, `from` gets the counterparty role
    #[default]
    Exchange,
    /// `to` gets the requesting role, `from` is left as it was
    Overwrite,
}

impl SwapPolicy {
    /// Wire form of an applied swap. Replaying it with `apply_exchange`
    /// rebuilds the same two dates this policy wrote.
    pub fn record_for(self, entry: &SwapHistoryEntry) -> SwapRecord {
        let mut record = entry.to_record();
        if self == SwapPolicy::Overwrite {
            // the origin kept the requesting role
            record.swapped_with = Some(entry.requesting_role.clone());
        }
        record
    }
}

#[derive(Debug, Default)]
pub enum SwapState {
    #[default]
    Idle,
    PendingConfirmation(SwapRequest),
}

impl SwapState {
    fn name(&self) -> &'static str {
        match self {
            SwapState::Idle => "idle",
            SwapState::PendingConfirmation(_) => "a swap is pending confirmation",
        }
    }
}

/// Writes `person` onto `to` and `swapped_with` onto `from`.
/// An absent `swapped_with` leaves `from` empty.
pub fn apply_exchange(
    assignments: &mut AssignmentMap,
    from: DateKey,
    to: DateKey,
    person: &Role,
    swapped_with: Option<&Role>,
) {
    assignments.insert(to, person.clone());
    match swapped_with {
        Some(role) => {
            assignments.insert(from, role.clone());
        }
        None => {
            assignments.remove(&from);
        }
    }
}

/// Idle -> PendingConfirmation -> Idle
#[derive(Debug, Default)]
pub struct SwapEngine {
    state: SwapState,
    policy: SwapPolicy,
}

impl SwapEngine {
    pub fn new(policy: SwapPolicy) -> Self {
        Self { state: SwapState::Idle, policy }
    }

    pub fn state(&self) -> &SwapState {
        &self.state
    }

    pub fn policy(&self) -> SwapPolicy {
        self.policy
    }

    pub fn pending(&self) -> Option<&SwapRequest> {
        match &self.state {
            SwapState::PendingConfirmation(request) => Some(request),
            SwapState::Idle => None,
        }
    }

    /// Validates a swap and holds it for confirmation.
    /// Nothing is mutated when any check fails.
    pub fn propose(
        &mut self,
        assignments: &AssignmentMap,
        from: Option<DateKey>,
        to: Option<DateKey>,
        acting_role: &Role,
        acknowledged: bool,
    ) -> Result<SwapRequest> {
        if let SwapState::PendingConfirmation(_) = self.state {
            return Err(RosterError::InvalidStateTransition {
                action: "propose a swap",
                state: self.state.name(),
            });
        }
        if !acknowledged {
            return Err(RosterError::NotAcknowledged);
        }
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(RosterError::MissingDate),
        };
        if assignments.get(&from) != Some(acting_role) {
            return Err(RosterError::NotAssigned {
                date: from.to_string(),
                role: acting_role.to_string(),
            });
        }

        let request = SwapRequest {
            from,
            to,
            requesting_role: acting_role.clone(),
            counterparty_role: assignments.get(&to).cloned(),
        };
        log::debug!(
            "swap pending: {} {} -> {} (with {:?})",
            request.requesting_role,
            request.from,
            request.to,
            request.counterparty_role
        );

        self.state = SwapState::PendingConfirmation(request.clone());
        Ok(request)
    }

    /// Applies the pending swap, records it and returns to Idle
    pub fn confirm(
        &mut self,
        assignments: &mut AssignmentMap,
        history: &mut SwapHistory,
        timestamp: DateTime<Local>,
    ) -> Result<SwapHistoryEntry> {
        let request = match std::mem::take(&mut self.state) {
            SwapState::PendingConfirmation(request) => request,
            SwapState::Idle => {
                return Err(RosterError::InvalidStateTransition {
                    action: "confirm a swap",
                    state: SwapState::Idle.name(),
                })
            }
        };

        match self.policy {
            SwapPolicy::Exchange => apply_exchange(
                assignments,
                request.from,
                request.to,
                &request.requesting_role,
                request.counterparty_role.as_ref(),
            ),
            SwapPolicy::Overwrite => {
                assignments.insert(request.to, request.requesting_role.clone());
            }
        }

        let entry = SwapHistoryEntry {
            timestamp,
            requesting_role: request.requesting_role,
            from: request.from,
            to: request.to,
            counterparty_role: request.counterparty_role,
        };
        history.append(entry.clone());
        log::info!(
            "swap applied: {} {} <-> {}",
            entry.requesting_role,
            entry.from,
            entry.to
        );
        Ok(entry)
    }

    /// Drops the pending swap without touching anything else
    pub fn cancel(&mut self) -> Result<SwapRequest> {
        match std::mem::take(&mut self.state) {
            SwapState::PendingConfirmation(request) => Ok(request),
            SwapState::Idle => Err(RosterError::InvalidStateTransition {
                action: "cancel a swap",
                state: SwapState::Idle.name(),
            }),
        }
    }
}
