use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::timeout;
use url_watch::domain::broadcast::{
    BroadcastHub, DEFAULT_QUEUE_CAPACITY, DEFAULT_SUBSCRIBER_BUFFER, EntrySink, SinkError,
    Termination,
};
use url_watch::domain::entities::{Entry, EntryNotification};
use url_watch::utils::id_generator::hash_url;

const WAIT: Duration = Duration::from_secs(2);

fn entry(id: &str) -> Entry {
    let url = format!("https://example.com/{id}");
    Entry::new(id.to_string(), url.clone(), hash_url(&url))
}

async fn recv(rx: &mut mpsc::Receiver<EntryNotification>) -> EntryNotification {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for notification")
        .expect("stream closed")
}

/// Sink that rejects every notification.
struct FailingSink;

#[async_trait]
impl EntrySink for FailingSink {
    async fn deliver(&mut self, _: EntryNotification) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

/// Sink that blocks forever on its first notification.
struct StuckSink {
    entered: Arc<Notify>,
}

#[async_trait]
impl EntrySink for StuckSink {
    async fn deliver(&mut self, _: EntryNotification) -> Result<(), SinkError> {
        self.entered.notify_one();
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[tokio::test]
async fn test_every_subscriber_receives_every_notification() {
    let hub = BroadcastHub::new(16, 8);

    let mut receivers = Vec::new();
    let mut handles = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::channel(8);
        handles.push(hub.subscribe(tx));
        receivers.push(rx);
    }
    assert_eq!(hub.subscriber_count(), 3);

    assert!(hub.publish(&entry("aaa111")));
    assert!(hub.publish(&entry("bbb222")));

    for rx in &mut receivers {
        assert_eq!(recv(rx).await.id, "aaa111");
        assert_eq!(recv(rx).await.id, "bbb222");
    }
}

#[tokio::test]
async fn test_notifications_arrive_in_publish_order() {
    let hub = BroadcastHub::new(64, 64);
    let (tx, mut rx) = mpsc::channel(64);
    let _handle = hub.subscribe(tx);

    let ids: Vec<String> = (0..20).map(|i| format!("id{i:04}")).collect();
    for id in &ids {
        assert!(hub.publish(&entry(id)));
    }

    for id in &ids {
        assert_eq!(&recv(&mut rx).await.id, id);
    }
}

#[tokio::test]
async fn test_notification_carries_id_and_url() {
    let hub = BroadcastHub::new(4, 4);
    let (tx, mut rx) = mpsc::channel(4);
    let _handle = hub.subscribe(tx);

    let published = entry("abc123");
    hub.publish(&published);

    let notification = recv(&mut rx).await;
    assert_eq!(notification, EntryNotification::from(&published));
    assert_eq!(notification.url, "https://example.com/abc123");
}

#[tokio::test]
async fn test_publish_with_no_subscribers_is_harmless() {
    let hub = BroadcastHub::new(4, 4);

    for i in 0..10 {
        hub.publish(&entry(&format!("x{i}")));
    }

    assert_eq!(hub.subscriber_count(), 0);
    assert!(hub.is_open());
}

#[tokio::test]
async fn test_late_subscriber_sees_no_history() {
    let hub = BroadcastHub::new(8, 8);
    let (early_tx, mut early_rx) = mpsc::channel(8);
    let _early = hub.subscribe(early_tx);

    hub.publish(&entry("before"));
    assert_eq!(recv(&mut early_rx).await.id, "before");

    let (late_tx, mut late_rx) = mpsc::channel(8);
    let _late = hub.subscribe(late_tx);

    hub.publish(&entry("after"));

    assert_eq!(recv(&mut late_rx).await.id, "after");
    assert_eq!(recv(&mut early_rx).await.id, "after");
}

#[tokio::test]
async fn test_publish_never_blocks_when_queue_saturated() {
    let hub = BroadcastHub::new(4, 4);
    let entered = Arc::new(Notify::new());
    let _stuck = hub.subscribe(StuckSink { entered });

    // Nothing is consumed until this test yields.
    let accepted = timeout(WAIT, async {
        (0..100)
            .filter(|i| hub.publish(&entry(&format!("s{i}"))))
            .count()
    })
    .await
    .expect("publish blocked");

    assert_eq!(accepted, 4);
}

#[tokio::test]
async fn test_burst_within_queue_depth_reaches_every_subscriber() {
    let hub = BroadcastHub::new(DEFAULT_QUEUE_CAPACITY, DEFAULT_SUBSCRIBER_BUFFER);

    let mut receivers = Vec::new();
    let mut handles = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::channel(1000);
        handles.push(hub.subscribe(tx));
        receivers.push(rx);
    }

    let ids: Vec<String> = (0..DEFAULT_QUEUE_CAPACITY).map(|i| format!("b{i:04}")).collect();
    for id in &ids {
        assert!(hub.publish(&entry(id)));
    }

    for rx in &mut receivers {
        for id in &ids {
            assert_eq!(&recv(rx).await.id, id);
        }
    }
}

#[tokio::test]
async fn test_lagging_subscriber_skips_to_oldest_queued() {
    let hub = BroadcastHub::new(4, 4);
    let (tx, mut rx) = mpsc::channel(1);
    let handle = hub.subscribe(tx);

    for i in 0..20 {
        hub.publish(&entry(&format!("n{i:02}")));
    }

    for i in 16..20 {
        assert_eq!(recv(&mut rx).await.id, format!("n{i:02}"));
    }
    assert!(handle.is_active());
}

#[tokio::test]
async fn test_slow_subscriber_does_not_hold_back_others() {
    let hub = BroadcastHub::new(64, 2);

    let entered = Arc::new(Notify::new());
    let stuck = hub.subscribe(StuckSink {
        entered: entered.clone(),
    });

    let (tx, mut rx) = mpsc::channel(64);
    let _fast = hub.subscribe(tx);

    hub.publish(&entry("first"));
    timeout(WAIT, entered.notified()).await.unwrap();

    for i in 0..10 {
        hub.publish(&entry(&format!("n{i}")));
    }

    assert_eq!(recv(&mut rx).await.id, "first");
    for i in 0..10 {
        assert_eq!(recv(&mut rx).await.id, format!("n{i}"));
    }
    assert!(stuck.is_active());
}

#[tokio::test]
async fn test_sink_failure_terminates_subscription() {
    let hub = BroadcastHub::new(8, 8);
    let handle = hub.subscribe(FailingSink);

    hub.publish(&entry("boom00"));

    let termination = timeout(WAIT, handle.closed()).await.unwrap();
    assert_eq!(termination, Termination::SendFailed);
    assert_eq!(hub.subscriber_count(), 0);
}

#[tokio::test]
async fn test_dropped_receiver_is_removed_on_next_publish() {
    let hub = BroadcastHub::new(8, 8);
    let (tx, rx) = mpsc::channel(8);
    let handle = hub.subscribe(tx);
    drop(rx);

    hub.publish(&entry("gone00"));

    assert_eq!(
        timeout(WAIT, handle.closed()).await.unwrap(),
        Termination::SendFailed
    );
    assert_eq!(hub.subscriber_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_while_delivery_blocked() {
    let hub = BroadcastHub::new(8, 8);
    let entered = Arc::new(Notify::new());
    let handle = hub.subscribe(StuckSink {
        entered: entered.clone(),
    });

    hub.publish(&entry("stuck0"));
    timeout(WAIT, entered.notified()).await.unwrap();

    assert!(hub.unsubscribe(&handle));
    assert!(!hub.unsubscribe(&handle));

    assert_eq!(
        timeout(WAIT, handle.closed()).await.unwrap(),
        Termination::Cancelled
    );
}

#[tokio::test]
async fn test_registry_removal_ends_subscription() {
    let hub = BroadcastHub::new(8, 8);
    let (tx, _rx) = mpsc::channel(8);
    let handle = hub.subscribe(tx);

    assert!(hub.registry().remove(handle.id()));

    assert_eq!(
        timeout(WAIT, handle.closed()).await.unwrap(),
        Termination::Cancelled
    );
    assert_eq!(hub.subscriber_count(), 0);
}

#[tokio::test]
async fn test_dispatch_ends_when_hub_dropped() {
    let hub = BroadcastHub::new(8, 8);
    let (tx, _rx) = mpsc::channel(8);
    let handle = hub.subscribe(tx);

    drop(hub);

    assert_eq!(
        timeout(WAIT, handle.closed()).await.unwrap(),
        Termination::Cancelled
    );
}
