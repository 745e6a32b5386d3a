//! Server-Sent Events support

use super::types::SessionSnapshot;
use crate::runtime::SessionUpdate;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream, starting with the current session
pub fn sse_stream(
    snapshot: Option<SessionSnapshot>,
    broadcast_rx: tokio::sync::broadcast::Receiver<SessionUpdate>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = InitEvent {
        kind: "init",
        session: snapshot,
    };
    let init_event = Event::default()
        .event("init")
        .json_data(&init)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to encode init event");
            Event::default().event("init").data("{}")
        });
    let init = futures::stream::once(async move { Ok::<_, Infallible>(init_event) });

    let updates = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(update) => update_to_axum(&update).map(Ok::<_, Infallible>),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

#[derive(Serialize)]
struct InitEvent {
    #[serde(rename = "type")]
    kind: &'static str,
    session: Option<SessionSnapshot>,
}

fn update_to_axum(update: &SessionUpdate) -> Option<Event> {
    match Event::default().event(update.name()).json_data(update) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, event = update.name(), "Failed to encode session update");
            None
        }
    }
}
