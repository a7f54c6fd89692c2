//! Cancellable snapshot subscriptions.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A point-in-time list of records delivered by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
}

/// Producer half of a subscription, held by the collection backend.
#[derive(Debug)]
pub struct SnapshotSink<T> {
    tx: mpsc::Sender<Snapshot<T>>,
}

impl<T> SnapshotSink<T> {
    /// Deliver a snapshot.
    ///
    /// Returns `false` once the subscriber has gone away; the producer should
    /// stop at that point.
    pub async fn send(&self, items: Vec<T>) -> bool {
        self.tx.send(Snapshot { items }).await.is_ok()
    }

    /// Whether the subscriber has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half: a stream of snapshots until unsubscribed.
///
/// Dropping the subscription has the same effect as [`Subscription::unsubscribe`]
/// except that it does not wait for the producer task to finish.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<Snapshot<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T> {
    /// Create a connected sink/subscription pair with room for `buffer`
    /// undelivered snapshots.
    #[must_use]
    pub fn channel(buffer: usize) -> (SnapshotSink<T>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (SnapshotSink { tx }, Self { rx, task: None })
    }

    /// Tie the lifetime of a producer task to this subscription.
    #[must_use]
    pub fn attach(mut self, task: JoinHandle<()>) -> Self {
        if let Some(previous) = self.task.replace(task) {
            previous.abort();
        }
        self
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` when the producer has stopped.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.rx.recv().await
    }

    /// Take an already delivered snapshot without waiting.
    pub fn try_next(&mut self) -> Option<Snapshot<T>> {
        self.rx.try_recv().ok()
    }

    /// Stop the subscription and wait until the producer has released its
    /// resources.
    pub async fn unsubscribe(mut self) {
        self.rx.close();
        if let Some(task) = self.task.take() {
            task.abort();
            // A cancelled or finished task both mean the producer is gone.
            let _ = task.await;
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
