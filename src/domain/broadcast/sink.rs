//! Outbound streams that subscribers deliver notifications into.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::entities::EntryNotification;

/// Errors raised while delivering a notification to a subscriber.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The receiving side of the stream went away (client disconnected).
    #[error("subscriber stream closed")]
    Closed,

    /// The notification could not be encoded for the transport.
    #[error("failed to encode notification: {0}")]
    Encode(String),
}

/// One subscriber's outbound stream.
///
/// Each sink is owned by exactly one dispatch loop, so implementations do not
/// need to be shareable. A returned error terminates the subscription.
#[async_trait]
pub trait EntrySink: Send + 'static {
    /// Delivers a notification, waiting for the transport to accept it.
    async fn deliver(&mut self, notification: EntryNotification) -> Result<(), SinkError>;
}

#[async_trait]
impl EntrySink for mpsc::Sender<EntryNotification> {
    async fn deliver(&mut self, notification: EntryNotification) -> Result<(), SinkError> {
        mpsc::Sender::send(self, notification)
            .await
            .map_err(|_| SinkError::Closed)
    }
}
