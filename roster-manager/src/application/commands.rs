use crate::application::dto::MonthGridDto;
use crate::application::session::RosterSession;
use crate::domain::models::DateKey;
use crate::domain::swap_engine::SwapRequest;
use crate::domain::swap_history::SwapHistoryEntry;
use crate::error::Result;

// --- Navigation ---

pub fn navigate_month(session: &mut RosterSession, offset: i32) -> MonthGridDto {
    session.navigate(offset);
    show_month(session)
}

pub fn show_month(session: &RosterSession) -> MonthGridDto {
    MonthGridDto::build(session.cursor(), session.assignments())
}

/// Regenerates the month on screen, discarding swaps made in it
pub async fn reset_month(session: &mut RosterSession) -> MonthGridDto {
    let filled = session.reset_month().await;
    log::info!("reset {} to defaults ({} days)", session.cursor(), filled);
    show_month(session)
}

// --- Role ---

pub fn select_role(session: &mut RosterSession, name: &str) -> Result<String> {
    session.select_role(name).map(|r| r.to_string())
}

// --- Swap ---

/// Blank or unparseable input counts as "no date selected"
fn date_input(raw: &str) -> Option<DateKey> {
    Some(raw.trim()).filter(|s| !s.is_empty()).and_then(DateKey::parse)
}

pub fn propose_swap(
    session: &mut RosterSession,
    from: &str,
    to: &str,
    acknowledged: bool,
) -> Result<SwapRequest> {
    session.propose_swap(date_input(from), date_input(to), acknowledged)
}

pub async fn confirm_pending(session: &mut RosterSession) -> Result<SwapHistoryEntry> {
    session.confirm_swap().await
}

pub fn cancel_pending(session: &mut RosterSession) -> Result<SwapRequest> {
    session.cancel_swap()
}

// --- History ---

/// Whole CSV document, header first
pub fn export_history(session: &RosterSession) -> String {
    session.export_history().join("\n")
}
