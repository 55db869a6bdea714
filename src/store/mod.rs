//! Ticket persistence.
//!
//! A store hands out ticket snapshots, applies add/update/remove requests and
//! pushes a fresh snapshot to subscribers after every change. Snapshots are
//! always ordered by creation instant, newest first.

pub mod file;
pub mod memory;
pub mod watcher;

use crate::data::{NewTicket, Ticket, TicketId, TicketPatch};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Opaque store-side failure, surfaced to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    OperationFailed(String),
}

impl StoreError {
    pub fn failed(context: &str, err: impl std::fmt::Display) -> Self {
        Self::OperationFailed(format!("{}: {}", context, err))
    }
}

/// Message delivered to a subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Full current ticket set
    Snapshot(Vec<Ticket>),
    /// The store could not produce a snapshot
    Error(StoreError),
}

/// Live feed of store snapshots. Dropping it unsubscribes.
///
/// Only the latest event is kept: a subscriber that falls behind skips
/// intermediate snapshots but always ends on the current ticket set.
pub struct Subscription {
    receiver: watch::Receiver<StoreEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// The receiver's current value is delivered as the first event
    pub(crate) fn new(mut receiver: watch::Receiver<StoreEvent>, task: Option<JoinHandle<()>>) -> Self {
        receiver.mark_changed();
        Self { receiver, task }
    }

    /// Wait for the next event; `None` once the store side has gone away
    pub async fn next(&mut self) -> Option<StoreEvent> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Latest unseen event without waiting
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            _ => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Storage backend for tickets
pub trait TicketStore: Send + Sync {
    /// Current ticket set, newest first
    fn snapshot(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Store a new ticket and return its assigned id
    fn create(&self, ticket: NewTicket) -> Result<TicketId, StoreError>;

    /// Change only the fields listed in the patch. Fails for unknown ids.
    fn update(&self, id: &str, patch: &TicketPatch) -> Result<(), StoreError>;

    /// Delete a ticket. Removing an unknown id succeeds.
    fn remove(&self, id: &str) -> Result<(), StoreError>;

    /// Start receiving snapshots; the current set is delivered first
    fn subscribe(&self) -> Result<Subscription, StoreError>;
}

/// Assign a fresh ticket id
pub(crate) fn new_ticket_id() -> TicketId {
    uuid::Uuid::new_v4().to_string()
}
