use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::BookingEvent;
use crate::state::AppState;

// GET /api/admin/events — SSE stream of the booking feed
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
    pub last_id: Option<i64>,
}

fn feed_event(event: &BookingEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().data(data).event("booking_event")
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    let token = query.token.as_deref().unwrap_or("");
    if token != state.config.admin_token {
        return Err(AppError::Unauthorized);
    }

    let last_id = query.last_id.unwrap_or(0);

    // Catch up on events missed while disconnected
    let catchup_events = {
        let db = state.db.lock().unwrap();
        queries::get_events_since(&db, last_id).unwrap_or_default()
    };

    let rx = state.events_tx.subscribe();

    let catchup_stream = tokio_stream::iter(
        catchup_events
            .into_iter()
            .map(|event| Ok::<_, Infallible>(feed_event(&event))),
    );

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(feed_event(&event))),
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(
            30,
        ))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}
