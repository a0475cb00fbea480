use crate::auth::CallerAddress;
use crate::error::AppError;
use crate::models::{DrainedEventsResponse, EventPageResponse, PageQuery};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};

/// A page of the pending event log, oldest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<EventPageResponse>, AppError> {
    let offset = page.offset();
    let (total, events) = state
        .ledger(move |m| Ok((m.event_count()?, m.events_page(offset, page.limit())?)))
        .await?;
    Ok(Json(EventPageResponse {
        total,
        offset,
        events,
    }))
}

/// Hand every pending event to the caller and clear the log. Owner-only.
pub async fn drain_events(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
) -> Result<Json<DrainedEventsResponse>, AppError> {
    let events = state.ledger(move |m| m.take_events(&caller)).await?;
    Ok(Json(DrainedEventsResponse {
        drained: events.len(),
        events,
    }))
}
