//! Working-hours SLA arithmetic.
//!
//! Everything here is pure: no I/O, no clock reads, no shared state.
//! [`SlaEngine`] bundles a calendar with the per-priority budgets so callers
//! can thread one immutable value through instead of global constants.

pub mod accumulator;
pub mod calendar;
pub mod deadline;
pub mod hold;
pub mod status;

pub use accumulator::{as_hours, from_hours};
pub use calendar::{CalendarError, WorkingCalendar};
pub use deadline::{InvalidSlaHours, SlaPolicy};
pub use hold::{apply_hold, HoldCommand, HoldOutcome};
pub use status::{classify, TicketView};

use crate::data::{Priority, SlaStatus, Ticket};
use chrono::NaiveDateTime;

/// Calendar plus SLA budgets
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlaEngine {
    pub calendar: WorkingCalendar,
    pub policy: SlaPolicy,
}

impl SlaEngine {
    pub fn new(calendar: WorkingCalendar, policy: SlaPolicy) -> Self {
        Self { calendar, policy }
    }

    pub fn required_hours(&self, priority: Priority) -> f64 {
        self.policy.required_hours(priority)
    }

    /// Deadline for a ticket created at `created_at` with the given priority
    pub fn project_deadline(&self, created_at: NaiveDateTime, priority: Priority) -> NaiveDateTime {
        self.calendar
            .project_deadline(created_at, self.policy.required_time(priority))
    }

    pub fn working_hours_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> f64 {
        self.calendar.working_hours_between(start, end)
    }

    pub fn classify(&self, now: NaiveDateTime, deadline: NaiveDateTime, priority: Priority) -> SlaStatus {
        classify(now, deadline, self.required_hours(priority))
    }

    /// Status, progress and remaining-time label for a ticket at `now`
    pub fn view(&self, ticket: &Ticket, now: NaiveDateTime) -> TicketView {
        status::view(&self.calendar, ticket, now, self.required_hours(ticket.priority))
    }

    pub fn apply_hold(&self, ticket: &Ticket, command: HoldCommand) -> HoldOutcome {
        apply_hold(&self.calendar, ticket, command)
    }

    /// True when SLA time is not accruing at `now`
    pub fn is_outside_working_hours(&self, now: NaiveDateTime) -> bool {
        !self.calendar.is_working_session(now)
    }
}
