//! Server-Sent Events stream of newly stored entries.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::domain::broadcast::{EntrySink, SinkError};
use crate::domain::entities::EntryNotification;
use crate::state::AppState;

/// SSE event name carried by every notification.
pub const ENTRY_EVENT: &str = "entry";

/// Delivers notifications into an SSE response body.
pub struct SseSink {
    events: mpsc::Sender<Result<Event, Infallible>>,
}

impl SseSink {
    pub fn new(events: mpsc::Sender<Result<Event, Infallible>>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EntrySink for SseSink {
    async fn deliver(&mut self, notification: EntryNotification) -> Result<(), SinkError> {
        let event = Event::default()
            .event(ENTRY_EVENT)
            .id(notification.id.clone())
            .json_data(&notification)
            .map_err(|e| SinkError::Encode(e.to_string()))?;

        self.events
            .send(Ok(event))
            .await
            .map_err(|_| SinkError::Closed)
    }
}

/// Streams every entry stored from now on.
///
/// # Endpoint
///
/// `GET /api/watch`
///
/// # Events
///
/// ```text
/// event: entry
/// id: aZ3kQ9
/// data: {"id":"aZ3kQ9","url":"https://example.com"}
/// ```
///
/// Keep-alive comments are sent while idle. A client that disconnects is
/// unsubscribed immediately; a client that falls behind loses notifications
/// rather than slowing anyone else down.
pub async fn watch_handler(
    State(state): State<AppState>,
) -> Sse<KeepAliveStream<ReceiverStream<Result<Event, Infallible>>>> {
    let (tx, rx) = mpsc::channel(state.hub.subscriber_buffer());

    let disconnected = tx.clone();
    let handle = state.hub.subscribe(SseSink::new(tx));
    let ended = handle.done();
    let subscriber = handle.id();
    debug!(subscriber = %subscriber, "Watcher connected");

    // Unsubscribes when the client goes away; exits once the subscription ends.
    let hub = state.hub.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = disconnected.closed() => {
                debug!(subscriber = %subscriber, "Watcher disconnected");
                hub.unsubscribe(&handle);
            }
            _ = ended.cancelled() => {}
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}
