//! Live fanout of newly created entries to streaming watchers.
//!
//! # Flow
//!
//! 1. [`BroadcastHub::publish`] appends a notification to one bounded queue
//!    without waiting
//! 2. Every subscriber reads that queue through its own cursor, in its own
//!    dispatch loop, and forwards each notification into its own
//!    [`EntrySink`] until the sink fails or the subscription is cancelled
//! 3. A subscriber more than a queue's depth behind skips what it missed and
//!    resumes with the oldest notification still queued
//!
//! Delivery is best-effort and at-most-once. Nothing is persisted and late
//! subscribers see no history.

mod hub;
mod sink;

pub use hub::{
    BroadcastHub, DEFAULT_QUEUE_CAPACITY, DEFAULT_SUBSCRIBER_BUFFER, SubscriberId,
    SubscriberRegistry, SubscriptionHandle, Termination,
};
pub use sink::{EntrySink, SinkError};
