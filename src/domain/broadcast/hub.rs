//! Subscriber membership and the publish side of the broadcast queue.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::sink::EntrySink;
use crate::domain::entities::{Entry, EntryNotification};

/// Depth of the shared queue every subscriber reads from.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Depth of each subscriber's outbound transport buffer.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 32;

/// Opaque identifier of a live subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Why a subscription ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Unsubscribed, or the caller went away.
    Cancelled,
    /// The sink rejected a notification.
    SendFailed,
}

/// The live subscriber set.
///
/// Guarded by its own lock, which is never held across an await point.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    slots: Arc<Mutex<HashMap<SubscriberId, CancellationToken>>>,
    next_id: Arc<AtomicU64>,
}

impl SubscriberRegistry {
    fn register(&self, done: CancellationToken) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.slots.lock().insert(id, done);
        id
    }

    /// Removes a subscriber and cancels its liveness token.
    ///
    /// This is the only place a token is cancelled, and only the call that
    /// actually removes the slot does it, so the token is closed exactly once
    /// no matter how many paths race here. Returns false if the subscriber
    /// was already gone.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let done = self.slots.lock().remove(&id);
        match done {
            Some(done) => {
                done.cancel();
                true
            }
            None => false,
        }
    }

    /// Removes and cancels every subscriber.
    fn clear(&self) -> usize {
        let drained: Vec<SubscriberId> = self.slots.lock().keys().copied().collect();
        drained.into_iter().filter(|id| self.remove(*id)).count()
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`BroadcastHub::subscribe`].
pub struct SubscriptionHandle {
    id: SubscriberId,
    done: CancellationToken,
    task: JoinHandle<Termination>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// True until the subscription reaches its terminal state.
    pub fn is_active(&self) -> bool {
        !self.done.is_cancelled()
    }

    /// Token cancelled when the subscription ends.
    ///
    /// This is a child of the subscription's own token: cancelling it does
    /// not end the subscription. Use [`BroadcastHub::unsubscribe`] for that.
    pub fn done(&self) -> CancellationToken {
        self.done.child_token()
    }

    /// Waits for the dispatch loop to finish and reports why it stopped.
    pub async fn closed(self) -> Termination {
        self.task.await.unwrap_or(Termination::Cancelled)
    }
}

/// Fans out created entries to every live subscriber.
///
/// Publishing never waits. Every subscriber reads the same bounded queue
/// through its own cursor, in its own dispatch loop owning its own
/// [`EntrySink`]. A subscriber that falls more than a queue's depth behind
/// skips the notifications it missed; nobody else is affected.
///
/// # Subscriber lifecycle
///
/// `Registered -> Dispatching -> Terminated`, where termination is reached
/// through a sink failure or through [`BroadcastHub::unsubscribe`].
pub struct BroadcastHub {
    queue: broadcast::Sender<EntryNotification>,
    queue_capacity: usize,
    subscriber_buffer: usize,
    registry: SubscriberRegistry,
    closed: AtomicBool,
}

impl BroadcastHub {
    /// Creates a hub.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is zero.
    pub fn new(queue_capacity: usize, subscriber_buffer: usize) -> Self {
        assert!(subscriber_buffer > 0, "subscriber buffer must be positive");
        let (queue, _) = broadcast::channel(queue_capacity);
        info!(queue_capacity, subscriber_buffer, "Broadcast hub started");

        Self {
            queue,
            queue_capacity,
            subscriber_buffer,
            registry: SubscriberRegistry::default(),
            closed: AtomicBool::new(false),
        }
    }

    /// Shared view of the subscriber set.
    pub fn registry(&self) -> SubscriberRegistry {
        self.registry.clone()
    }

    /// Enqueues a created-entry notification without blocking.
    ///
    /// Returns false if the hub is closed, or if the queue was already full
    /// so that the slowest subscribers lose their oldest pending update.
    /// Subscribers that keep up still receive this notification.
    pub fn publish(&self, entry: &Entry) -> bool {
        if self.closed.load(Ordering::Acquire) {
            debug!(entry = %entry.id, "Broadcast hub closed; dropping update");
            return false;
        }

        let saturated = self.queue.len() >= self.queue_capacity;

        // Fails only when nobody is subscribed.
        let _ = self.queue.send(EntryNotification::from(entry));

        if saturated {
            warn!(entry = %entry.id, "Broadcast queue full; lagging subscribers drop updates");
        }
        !saturated
    }

    /// Registers a new subscriber and starts its dispatch loop.
    ///
    /// The subscriber receives notifications published after this call
    /// returns. Must be called within a tokio runtime.
    pub fn subscribe<S: EntrySink>(&self, sink: S) -> SubscriptionHandle {
        let receiver = self.queue.subscribe();
        let done = CancellationToken::new();

        let id = self.registry.register(done.clone());
        debug!(subscriber = %id, "Subscriber registered");

        let task = tokio::spawn(dispatch(
            id,
            sink,
            receiver,
            done.clone(),
            self.registry.clone(),
        ));

        SubscriptionHandle { id, done, task }
    }

    /// Removes a subscriber. Idempotent: returns false if it was already gone.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let removed = self.registry.remove(handle.id);
        if removed {
            debug!(subscriber = %handle.id, "Subscriber removed");
        }
        removed
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// True until [`BroadcastHub::close_all`] is called.
    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Total depth of the shared queue.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Depth transports should use for their own per-subscriber buffer.
    pub fn subscriber_buffer(&self) -> usize {
        self.subscriber_buffer
    }

    /// Stops accepting notifications and terminates every subscription.
    /// Used on server shutdown.
    pub fn close_all(&self) -> usize {
        self.closed.store(true, Ordering::Release);
        let closed = self.registry.clear();
        if closed > 0 {
            info!(subscribers = closed, "Closed all subscriptions");
        }
        closed
    }
}

/// A subscriber's dispatch loop.
///
/// Waits on its own queue cursor and its own cancellation token only; the
/// registry lock is taken once, on exit.
async fn dispatch<S: EntrySink>(
    id: SubscriberId,
    mut sink: S,
    mut queue: broadcast::Receiver<EntryNotification>,
    done: CancellationToken,
    registry: SubscriberRegistry,
) -> Termination {
    let termination = loop {
        let notification = tokio::select! {
            biased;
            _ = done.cancelled() => break Termination::Cancelled,
            next = queue.recv() => match next {
                Ok(notification) => notification,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(subscriber = %id, skipped, "Subscriber lagging; dropping updates");
                    continue;
                }
                Err(RecvError::Closed) => break Termination::Cancelled,
            },
        };

        let delivered = tokio::select! {
            biased;
            _ = done.cancelled() => break Termination::Cancelled,
            result = sink.deliver(notification) => result,
        };

        if let Err(e) = delivered {
            debug!(subscriber = %id, "Delivery failed: {}", e);
            break Termination::SendFailed;
        }
    };

    registry.remove(id);
    debug!(subscriber = %id, ?termination, "Subscriber terminated");
    termination
}
