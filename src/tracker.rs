//! Ticket tracker: the caller side of the store.
//!
//! Holds the last observed snapshot, turns form input into stored tickets,
//! and routes hold toggles through the hold state machine. Failed store
//! operations are returned and also kept in an error slot for display.

use crate::data::{timestamp, NewTicket, Priority, Ticket, TicketId, TicketPatch};
use crate::sla::{HoldCommand, HoldOutcome, SlaEngine, TicketView};
use crate::store::{StoreError, StoreEvent, TicketStore};
use anyhow::Result;
use chrono::{Duration, NaiveDateTime};

/// Input for a new ticket
#[derive(Debug, Clone, Default)]
pub struct TicketForm {
    pub ticket_code: String,
    pub description: String,
    pub priority: Priority,
    /// Defaults to "now" when absent
    pub created_at: Option<NaiveDateTime>,
}

/// What a hold request ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum HoldTransition {
    Held,
    Resumed { debt: Duration },
    /// Ticket already in the requested state
    Unchanged,
    /// No ticket with that id in the last snapshot
    StaleReference,
}

pub struct TicketTracker<S> {
    store: S,
    engine: SlaEngine,
    tickets: Vec<Ticket>,
    loading: bool,
    error: Option<String>,
}

impl<S: TicketStore> TicketTracker<S> {
    pub fn new(store: S, engine: SlaEngine) -> Self {
        Self {
            store,
            engine,
            tickets: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn engine(&self) -> &SlaEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last observed ticket set, newest first
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// True until the first snapshot or error arrives
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Pull a snapshot directly from the store
    pub fn refresh(&mut self) -> Result<()> {
        let result = self.store.snapshot();
        self.apply_event(match result {
            Ok(tickets) => StoreEvent::Snapshot(tickets),
            Err(e) => StoreEvent::Error(e),
        });
        match &self.error {
            Some(message) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    /// Consume one subscription event
    pub fn apply_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Snapshot(tickets) => {
                self.tickets = tickets;
                self.error = None;
            }
            StoreEvent::Error(e) => {
                tracing::warn!("Ticket sync failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    /// Find a ticket by store id or, failing that, by ticket code (case-insensitive)
    pub fn find(&self, reference: &str) -> Option<&Ticket> {
        self.tickets
            .iter()
            .find(|t| t.id == reference)
            .or_else(|| {
                self.tickets
                    .iter()
                    .find(|t| t.ticket_code.eq_ignore_ascii_case(reference))
            })
    }

    /// Validate the form, project its deadline and store the ticket
    pub fn add_ticket(&mut self, form: TicketForm, now: NaiveDateTime) -> Result<TicketId> {
        let ticket_code = form.ticket_code.trim();
        let description = form.description.trim();
        if ticket_code.is_empty() {
            anyhow::bail!("Ticket ID is required");
        }
        if description.is_empty() {
            anyhow::bail!("Description is required");
        }

        let created_at = timestamp::truncate(form.created_at.unwrap_or(now));
        let sla_end_time = self.engine.project_deadline(created_at, form.priority);
        let ticket = NewTicket::open(
            ticket_code,
            description,
            form.priority,
            created_at,
            sla_end_time,
        );

        let id = self.record(self.store.create(ticket), "add ticket")?;
        tracing::info!(
            "Added {} ({}) due {}",
            ticket_code,
            form.priority,
            sla_end_time
        );
        Ok(id)
    }

    /// Apply a partial update
    pub fn update_ticket(&mut self, id: &str, patch: &TicketPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let result = self.store.update(id, patch);
        self.record(result, "update ticket")
    }

    pub fn remove_ticket(&mut self, id: &str) -> Result<()> {
        let result = self.store.remove(id);
        self.record(result, "delete ticket")?;
        tracing::info!("Removed ticket {}", id);
        Ok(())
    }

    /// Flip the hold state of a ticket
    pub fn toggle_hold(&mut self, id: &str, now: NaiveDateTime) -> Result<HoldTransition> {
        let Some(ticket) = self.tickets.iter().find(|t| t.id == id) else {
            return Ok(self.stale(id));
        };
        let command = HoldCommand::toggle(ticket, timestamp::truncate(now));
        self.execute_hold(id, command)
    }

    pub fn place_on_hold(&mut self, id: &str, now: NaiveDateTime) -> Result<HoldTransition> {
        self.execute_hold(
            id,
            HoldCommand::PlaceOnHold {
                at: timestamp::truncate(now),
            },
        )
    }

    pub fn resume(&mut self, id: &str, now: NaiveDateTime) -> Result<HoldTransition> {
        self.execute_hold(
            id,
            HoldCommand::Resume {
                at: timestamp::truncate(now),
            },
        )
    }

    fn execute_hold(&mut self, id: &str, command: HoldCommand) -> Result<HoldTransition> {
        let Some(ticket) = self.tickets.iter().find(|t| t.id == id) else {
            return Ok(self.stale(id));
        };

        let outcome = self.engine.apply_hold(ticket, command);
        let (updated, transition) = match outcome {
            HoldOutcome::Held(updated) => (updated, HoldTransition::Held),
            HoldOutcome::Resumed { ticket: updated, debt } => {
                (updated, HoldTransition::Resumed { debt })
            }
            HoldOutcome::Unchanged => {
                tracing::debug!("Hold request for {} left it unchanged", id);
                return Ok(HoldTransition::Unchanged);
            }
        };

        let patch = TicketPatch::between(ticket, &updated);
        let result = self.store.update(id, &patch);
        self.record(result, "toggle hold status")?;

        match &transition {
            HoldTransition::Held => {
                tracing::info!("{} placed on hold at {}", updated.ticket_code, command.at())
            }
            HoldTransition::Resumed { debt } => tracing::info!(
                "{} resumed, deadline moved by {:.2}h to {}",
                updated.ticket_code,
                crate::sla::as_hours(*debt),
                updated.adjusted_sla_end_time
            ),
            _ => {}
        }
        Ok(transition)
    }

    fn stale(&self, id: &str) -> HoldTransition {
        tracing::debug!("Ignoring hold request for unknown ticket {}", id);
        HoldTransition::StaleReference
    }

    /// Status view of every ticket in the last snapshot
    pub fn views(&self, now: NaiveDateTime) -> Vec<(&Ticket, TicketView)> {
        self.tickets
            .iter()
            .map(|t| (t, self.engine.view(t, now)))
            .collect()
    }

    fn record<T>(&mut self, result: Result<T, StoreError>, action: &str) -> Result<T> {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(e) => {
                tracing::error!("Failed to {}: {}", action, e);
                self.error = Some(e.to_string());
                Err(anyhow::Error::new(e).context(format!("Failed to {}", action)))
            }
        }
    }
}
