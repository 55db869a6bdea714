pub mod sorting;
pub mod timestamp;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque ticket identifier assigned by the store
pub type TicketId = String;

/// Ticket priority class, P1 most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Priority {
    #[default]
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    /// Short code as stored and typed ("P1".."P4")
    pub fn code(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::P1 => "Critical",
            Self::P2 => "High",
            Self::P3 => "Medium",
            Self::P4 => "Low",
        }
    }

    /// Sort order (lower = more urgent)
    pub fn sort_order(&self) -> u8 {
        match self {
            Self::P1 => 0,
            Self::P2 => 1,
            Self::P3 => 2,
            Self::P4 => 3,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::P1, Self::P2, Self::P3, Self::P4].into_iter()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown priority '{}' (expected P1, P2, P3 or P4)", s))
    }
}

/// Discrete SLA urgency state shown for a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlaStatus {
    Ok,
    Warning,
    Critical,
    Breached,
    OnHold,
}

impl SlaStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
            Self::Breached => "Breached",
            Self::OnHold => "On Hold",
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::Critical | Self::Breached)
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A support ticket tracked against its SLA deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub ticket_code: String, // e.g., "TICKET-001"
    pub description: String,
    pub priority: Priority,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    /// Deadline projected at creation, never changed afterwards
    #[serde(with = "timestamp")]
    pub sla_end_time: NaiveDateTime,
    #[serde(default)]
    pub is_on_hold: bool,
    #[serde(default, with = "timestamp::option")]
    pub hold_start: Option<NaiveDateTime>,
    /// Deadline currently in force, pushed later by each completed hold
    #[serde(with = "timestamp")]
    pub adjusted_sla_end_time: NaiveDateTime,
}

impl Ticket {
    pub fn from_new(id: TicketId, new: NewTicket) -> Self {
        Self {
            id,
            ticket_code: new.ticket_code,
            description: new.description,
            priority: new.priority,
            created_at: new.created_at,
            sla_end_time: new.sla_end_time,
            is_on_hold: new.is_on_hold,
            hold_start: new.hold_start,
            adjusted_sla_end_time: new.adjusted_sla_end_time,
        }
    }

    /// The deadline in force
    pub fn effective_deadline(&self) -> NaiveDateTime {
        self.adjusted_sla_end_time
    }
}

/// A ticket that has not been stored yet (no id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub ticket_code: String,
    pub description: String,
    pub priority: Priority,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub sla_end_time: NaiveDateTime,
    pub is_on_hold: bool,
    #[serde(with = "timestamp::option")]
    pub hold_start: Option<NaiveDateTime>,
    #[serde(with = "timestamp")]
    pub adjusted_sla_end_time: NaiveDateTime,
}

impl NewTicket {
    /// A fresh, active ticket whose effective deadline equals its original one
    pub fn open(
        ticket_code: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        created_at: NaiveDateTime,
        sla_end_time: NaiveDateTime,
    ) -> Self {
        Self {
            ticket_code: ticket_code.into(),
            description: description.into(),
            priority,
            created_at,
            sla_end_time,
            is_on_hold: false,
            hold_start: None,
            adjusted_sla_end_time: sla_end_time,
        }
    }
}

/// Partial update: only `Some` fields change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketPatch {
    pub ticket_code: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub is_on_hold: Option<bool>,
    /// `Some(None)` clears the hold start
    pub hold_start: Option<Option<NaiveDateTime>>,
    pub adjusted_sla_end_time: Option<NaiveDateTime>,
}

impl TicketPatch {
    /// The patch that turns `before` into `after`. The original deadline and
    /// creation instant are never part of a patch.
    pub fn between(before: &Ticket, after: &Ticket) -> Self {
        fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
            (old != new).then(|| new.clone())
        }

        Self {
            ticket_code: changed(&before.ticket_code, &after.ticket_code),
            description: changed(&before.description, &after.description),
            priority: changed(&before.priority, &after.priority),
            is_on_hold: changed(&before.is_on_hold, &after.is_on_hold),
            hold_start: changed(&before.hold_start, &after.hold_start),
            adjusted_sla_end_time: changed(
                &before.adjusted_sla_end_time,
                &after.adjusted_sla_end_time,
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(code) = &self.ticket_code {
            ticket.ticket_code = code.clone();
        }
        if let Some(description) = &self.description {
            ticket.description = description.clone();
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(on_hold) = self.is_on_hold {
            ticket.is_on_hold = on_hold;
        }
        if let Some(hold_start) = self.hold_start {
            ticket.hold_start = hold_start;
        }
        if let Some(adjusted) = self.adjusted_sla_end_time {
            ticket.adjusted_sla_end_time = adjusted;
        }
    }
}
