//! Hold/resume state machine.
//!
//! A ticket is either active or held. Placing it on hold records when the
//! pause began; resuming credits the working time that elapsed during the
//! pause back onto the effective deadline. Commands are applied to a ticket
//! value and yield a new value, leaving persistence to the caller.

use super::calendar::WorkingCalendar;
use crate::data::Ticket;
use chrono::{Duration, NaiveDateTime};

/// A hold transition requested at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldCommand {
    PlaceOnHold { at: NaiveDateTime },
    Resume { at: NaiveDateTime },
}

impl HoldCommand {
    /// The command that flips the ticket's current hold state
    pub fn toggle(ticket: &Ticket, at: NaiveDateTime) -> Self {
        if ticket.is_on_hold {
            Self::Resume { at }
        } else {
            Self::PlaceOnHold { at }
        }
    }

    pub fn at(&self) -> NaiveDateTime {
        match self {
            Self::PlaceOnHold { at } | Self::Resume { at } => *at,
        }
    }
}

/// What a command did to a ticket
#[derive(Debug, Clone, PartialEq)]
pub enum HoldOutcome {
    Held(Ticket),
    Resumed { ticket: Ticket, debt: Duration },
    /// Already in the requested state, or resumed without a recorded hold start
    Unchanged,
}

impl HoldOutcome {
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            Self::Held(ticket) | Self::Resumed { ticket, .. } => Some(ticket),
            Self::Unchanged => None,
        }
    }
}

/// Apply a hold command to a ticket.
pub fn apply_hold(calendar: &WorkingCalendar, ticket: &Ticket, command: HoldCommand) -> HoldOutcome {
    match command {
        HoldCommand::PlaceOnHold { at } => {
            if ticket.is_on_hold {
                return HoldOutcome::Unchanged;
            }
            let mut held = ticket.clone();
            held.is_on_hold = true;
            held.hold_start = Some(at);
            HoldOutcome::Held(held)
        }
        HoldCommand::Resume { at } => {
            let Some(hold_start) = ticket.hold_start.filter(|_| ticket.is_on_hold) else {
                return HoldOutcome::Unchanged;
            };

            let debt = calendar.working_time_between(hold_start, at);
            let mut resumed = ticket.clone();
            resumed.adjusted_sla_end_time = ticket.adjusted_sla_end_time + debt;
            resumed.hold_start = None;
            resumed.is_on_hold = false;
            HoldOutcome::Resumed {
                ticket: resumed,
                debt,
            }
        }
    }
}
