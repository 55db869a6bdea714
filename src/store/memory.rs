//! In-process ticket store.
//!
//! Keeps tickets in memory and fans snapshots out to every live subscriber.
//! Used by tests and as a scratch backend.

use super::{new_ticket_id, StoreError, StoreEvent, Subscription, TicketStore};
use crate::data::sorting::sort_newest_first;
use crate::data::{NewTicket, Ticket, TicketId, TicketPatch};
use crate::util::publish_or_log;
use std::sync::Mutex;
use tokio::sync::watch;

#[derive(Default)]
struct Inner {
    tickets: Vec<Ticket>,
    subscribers: Vec<watch::Sender<StoreEvent>>,
}

impl Inner {
    fn snapshot(&self) -> Vec<Ticket> {
        let mut tickets = self.tickets.clone();
        sort_newest_first(&mut tickets);
        tickets
    }

    /// Push the current set to subscribers, forgetting the ones that hung up
    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| publish_or_log(tx, StoreEvent::Snapshot(snapshot.clone()), "ticket snapshot"));
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with existing tickets (ids kept as given)
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tickets,
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::failed("Ticket store lock poisoned", e))
    }
}

impl TicketStore for MemoryStore {
    fn snapshot(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.lock()?.snapshot())
    }

    fn create(&self, ticket: NewTicket) -> Result<TicketId, StoreError> {
        let mut inner = self.lock()?;
        let id = new_ticket_id();
        inner.tickets.push(Ticket::from_new(id.clone(), ticket));
        inner.publish();
        Ok(id)
    }

    fn update(&self, id: &str, patch: &TicketPatch) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let ticket = inner
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::OperationFailed(format!("Ticket {} not found", id)))?;
        patch.apply_to(ticket);
        inner.publish();
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let before = inner.tickets.len();
        inner.tickets.retain(|t| t.id != id);
        if inner.tickets.len() != before {
            inner.publish();
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<Subscription, StoreError> {
        let mut inner = self.lock()?;
        let (tx, rx) = watch::channel(StoreEvent::Snapshot(inner.snapshot()));
        inner.subscribers.push(tx);
        Ok(Subscription::new(rx, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Priority;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_ticket(code: &str, created: NaiveDateTime) -> NewTicket {
        NewTicket::open(code, "desc", Priority::P2, created, at(9, 12))
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let store = MemoryStore::new();
        let err = store.update("missing", &TicketPatch::default()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_remove_unknown_id_succeeds() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_sees_initial_then_changes() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe().unwrap();
        assert_eq!(sub.next().await, Some(StoreEvent::Snapshot(vec![])));

        store.create(new_ticket("A", at(1, 12))).unwrap();
        store.create(new_ticket("B", at(2, 12))).unwrap();

        // Both writes collapse into the latest snapshot
        match sub.next().await {
            Some(StoreEvent::Snapshot(tickets)) => {
                let codes: Vec<_> = tickets.iter().map(|t| t.ticket_code.as_str()).collect();
                assert_eq!(codes, vec!["B", "A"]);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_lagging_subscriber_ends_on_current_set() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe().unwrap();
        for i in 0..40 {
            store
                .create(new_ticket(&format!("T-{}", i), at(1, 12)))
                .unwrap();
        }

        let mut last = None;
        while let Some(event) = sub.try_next() {
            last = Some(event);
        }
        match last {
            Some(StoreEvent::Snapshot(tickets)) => assert_eq!(tickets.len(), 40),
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_forgotten() {
        let store = MemoryStore::new();
        let sub = store.subscribe().unwrap();
        drop(sub);
        store.create(new_ticket("A", at(1, 12))).unwrap();
        assert!(store.lock().unwrap().subscribers.is_empty());
    }
}
