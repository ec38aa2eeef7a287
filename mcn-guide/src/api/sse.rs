//! Server-Sent Events for one visitor session
//!
//! Streams:
//! - AccessGranted
//! - RouteCompleted (one-time congratulation)
//! - CameraReleased (client stops its video stream)
//! - SessionEnded (last event; the stream closes)

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use mcn_common::events::McnEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::session::Visitor;
use crate::AppState;

/// GET /api/events - SSE stream of the caller's session events
pub async fn event_stream(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = visitor.id;
    info!(session_id = %session_id, "SSE client connected");

    let mut rx = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    if !state.sessions.contains(&session_id).await {
                        info!(session_id = %session_id, "Session gone; ending SSE stream");
                        break;
                    }
                    yield Ok(Event::default().comment("heartbeat"));
                }

                received = rx.recv() => match received {
                    Ok(event) if event.session_id() == session_id => {
                        let event_type = event.event_type();
                        match serde_json::to_string(&event) {
                            Ok(event_json) => {
                                debug!(session_id = %session_id, "SSE: sending {}", event_type);
                                yield Ok(Event::default()
                                    .event(event_type)
                                    .data(event_json));
                                if matches!(event, McnEvent::SessionEnded { .. }) {
                                    info!(session_id = %session_id, "Session ended; closing SSE stream");
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session_id = %session_id, skipped, "SSE client lagging; events dropped");
                    }
                    Err(RecvError::Closed) => {
                        info!(session_id = %session_id, "Event bus closed; ending SSE stream");
                        break;
                    }
                },
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
