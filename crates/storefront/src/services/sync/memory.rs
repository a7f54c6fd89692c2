//! In-process synced collection.
//!
//! Stands in for the managed backend in the CLI and in tests. Records live in
//! a `watch` channel so every change reaches all observers.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, instrument};
use uuid::Uuid;

use bandmerch_core::ItemId;

use super::{Predicate, Record, SyncError, SyncedCollection, Subscription};

/// Undelivered snapshots a slow observer may fall behind by.
const OBSERVER_BUFFER: usize = 16;

/// A collection held in memory.
#[derive(Debug)]
pub struct MemoryCollection<T> {
    records: watch::Sender<Vec<T>>,
    fail_next: Mutex<Option<SyncError>>,
}

impl<T: Record> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryCollection<T> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a collection holding `records` as-is.
    #[must_use]
    pub fn with_records(records: Vec<T>) -> Self {
        let (records, _) = watch::channel(records);
        Self {
            records,
            fail_next: Mutex::new(None),
        }
    }

    /// Make the next query, save or observe call fail with `error`.
    pub fn fail_next(&self, error: SyncError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(error);
        }
    }

    /// Append a record without upserting.
    ///
    /// A sync engine can briefly deliver the same record twice while a local
    /// write and its remote echo are both pending; this reproduces that.
    pub fn insert_raw(&self, record: T) {
        self.records.send_modify(|records| records.push(record));
    }

    /// Delete every record with `id`. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        self.records.send_if_modified(|records| {
            let before = records.len();
            records.retain(|r| r.id().as_str() != id);
            records.len() != before
        })
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.records.receiver_count()
    }

    /// Number of stored rows, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn take_failure(&self) -> Result<(), SyncError> {
        let pending = self.fail_next.lock().ok().and_then(|mut slot| slot.take());
        pending.map_or(Ok(()), Err)
    }
}

fn matching<T: Record>(records: &[T], predicate: &Predicate<T>) -> Vec<T> {
    records
        .iter()
        .filter(|r| predicate.matches(r))
        .cloned()
        .collect()
}

#[async_trait]
impl<T: Record> SyncedCollection<T> for MemoryCollection<T> {
    async fn query(&self, predicate: &Predicate<T>) -> Result<Vec<T>, SyncError> {
        self.take_failure()?;
        Ok(matching(&self.records.borrow(), predicate))
    }

    #[instrument(skip_all)]
    async fn save(&self, mut record: T) -> Result<T, SyncError> {
        self.take_failure()?;

        if record.id().is_blank() {
            record.assign_id(ItemId::new(Uuid::new_v4().to_string()));
        }
        record.touch(Utc::now());

        let saved = record.clone();
        self.records.send_modify(|records| {
            if let Some(existing) = records.iter_mut().find(|r| r.id() == saved.id()) {
                *existing = record;
            } else {
                records.push(record);
            }
        });
        debug!(id = %saved.id(), "record saved");
        Ok(saved)
    }

    async fn observe(&self, predicate: Predicate<T>) -> Result<Subscription<T>, SyncError> {
        self.take_failure()?;

        let mut changes = self.records.subscribe();
        let (sink, subscription) = Subscription::channel(OBSERVER_BUFFER);
        let task = tokio::spawn(async move {
            loop {
                let items = matching(&changes.borrow_and_update(), &predicate);
                if !sink.send(items).await {
                    break;
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        });

        Ok(subscription.attach(task))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Band;

    fn catalog() -> MemoryCollection<Band> {
        MemoryCollection::with_records(vec![
            Band::new("a", "Alpha", "Shirt", 20.0),
            Band::new("b", "Beta", "Hat", 15.0),
        ])
    }

    #[tokio::test]
    async fn test_query_filters() {
        let bands = catalog();
        let all = bands.query(&Predicate::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let beta = bands
            .query(&Predicate::new(|b: &Band| b.band == "Beta"))
            .await
            .unwrap();
        assert_eq!(beta.len(), 1);
        assert_eq!(beta[0].id.as_str(), "b");
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_timestamps() {
        let bands = MemoryCollection::new();
        let saved = bands
            .save(Band::new("", "Gamma", "Mug", 8.0))
            .await
            .unwrap();
        assert!(!saved.id.is_blank());
        assert!(saved.created_at.is_some());
        assert_eq!(saved.created_at, saved.updated_at);
        assert_eq!(bands.len(), 1);
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let bands = catalog();
        let mut hat = Band::new("b", "Beta", "Hat", 15.0);
        hat.price = Some(18.0);
        bands.save(hat).await.unwrap();

        assert_eq!(bands.len(), 2);
        let stored = bands
            .query(&Predicate::new(|b: &Band| b.id.as_str() == "b"))
            .await
            .unwrap();
        assert_eq!(stored[0].price, Some(18.0));
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let bands = catalog();
        bands.fail_next(SyncError::Timeout);
        assert!(matches!(
            bands.query(&Predicate::all()).await,
            Err(SyncError::Timeout)
        ));
        assert!(bands.query(&Predicate::all()).await.is_ok());
    }

    #[tokio::test]
    async fn test_observe_initial_then_changes() {
        let bands = catalog();
        let mut sub = bands.observe(Predicate::all()).await.unwrap();

        let first = sub.next().await.unwrap();
        assert_eq!(first.items.len(), 2);

        bands.save(Band::new("c", "Gamma", "Mug", 8.0)).await.unwrap();
        let second = sub.next().await.unwrap();
        assert_eq!(second.items.len(), 3);

        assert!(bands.delete("a"));
        let third = sub.next().await.unwrap();
        assert_eq!(third.items.len(), 2);

        sub.unsubscribe().await;
        assert_eq!(bands.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_observe_applies_predicate() {
        let bands = catalog();
        let mut sub = bands
            .observe(Predicate::new(|b: &Band| b.band == "Alpha"))
            .await
            .unwrap();
        let first = sub.next().await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.items[0].band, "Alpha");
    }

    #[tokio::test]
    async fn test_observe_delivers_raw_duplicates() {
        let bands = catalog();
        let mut sub = bands.observe(Predicate::all()).await.unwrap();
        sub.next().await.unwrap();

        bands.insert_raw(Band::new("a", "Alpha", "Shirt", 20.0));
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.items.len(), 3);
    }

    #[tokio::test]
    async fn test_observe_ends_when_collection_dropped() {
        let bands = catalog();
        let mut sub = bands.observe(Predicate::all()).await.unwrap();
        sub.next().await.unwrap();
        drop(bands);
        assert!(sub.next().await.is_none());
    }
}
