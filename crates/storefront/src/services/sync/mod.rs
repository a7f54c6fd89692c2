//! Synced collection store.
//!
//! The managed backend exposes its local-first data store as collections of
//! records that can be queried once or observed as a stream of snapshots.
//! Network retries, merge resolution and offline sync all happen inside the
//! backend; this module only defines the interface the app consumes plus
//! the pure client-side deduplication step.

mod error;
pub mod memory;
mod subscription;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bandmerch_core::ItemId;

pub use error::SyncError;
pub use memory::MemoryCollection;
pub use subscription::{Snapshot, SnapshotSink, Subscription};

/// A record stored in a synced collection.
pub trait Record: Clone + Send + Sync + 'static {
    /// Backend-assigned identifier.
    fn id(&self) -> &ItemId;

    /// Replace the identifier (used when the store assigns one on save).
    fn assign_id(&mut self, id: ItemId);

    /// Update the bookkeeping timestamps on save.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Filter applied to a collection query or subscription.
pub struct Predicate<T> {
    filter: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> Predicate<T> {
    /// Match every record.
    #[must_use]
    pub const fn all() -> Self {
        Self { filter: None }
    }

    /// Match records for which `f` returns true.
    pub fn new(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            filter: Some(Arc::new(f)),
        }
    }

    #[must_use]
    pub fn matches(&self, record: &T) -> bool {
        self.filter.as_ref().is_none_or(|f| f(record))
    }
}

impl<T> Default for Predicate<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

/// A collection in the managed local-first store.
#[async_trait]
pub trait SyncedCollection<T: Record>: Send + Sync {
    /// Fetch the records currently matching `predicate`.
    async fn query(&self, predicate: &Predicate<T>) -> Result<Vec<T>, SyncError>;

    /// Insert or replace a record, returning it as stored.
    async fn save(&self, record: T) -> Result<T, SyncError>;

    /// Observe the records matching `predicate`.
    ///
    /// The subscription first yields the current matching records, then one
    /// snapshot per change, until it is unsubscribed or the store goes away.
    async fn observe(&self, predicate: Predicate<T>) -> Result<Subscription<T>, SyncError>;
}

/// Drop records whose id was already seen, keeping the first occurrence and
/// the original order.
#[must_use]
pub fn dedupe_by_id<T: Record>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|record| seen.insert(record.id().clone()))
        .collect()
}
