//! Urgency classification, progress and remaining-time labels.

use super::calendar::WorkingCalendar;
use crate::data::{SlaStatus, Ticket};
use chrono::{Duration, NaiveDateTime};

/// Hours of wall-clock time left below which a ticket is critical
pub const CRITICAL_HOURS: f64 = 2.0;

/// Fraction of the SLA budget left below which a ticket is in warning
pub const WARNING_FRACTION: f64 = 0.25;

pub const ON_HOLD_LABEL: &str = "On Hold - SLA paused";
pub const BREACHED_LABEL: &str = "Breached";

/// Classify an active ticket.
///
/// The thresholds compare raw wall-clock time to the deadline, not working
/// hours, even though the deadline itself was projected in working hours.
/// Never returns [`SlaStatus::OnHold`]; callers decide that from the hold flag.
pub fn classify(now: NaiveDateTime, deadline: NaiveDateTime, required_hours: f64) -> SlaStatus {
    if now >= deadline {
        return SlaStatus::Breached;
    }

    let hours_to_go = super::as_hours(deadline - now);
    if hours_to_go < CRITICAL_HOURS {
        SlaStatus::Critical
    } else if hours_to_go < required_hours * WARNING_FRACTION {
        SlaStatus::Warning
    } else {
        SlaStatus::Ok
    }
}

/// Percentage of the original working budget used, clamped to `0..=100`.
///
/// While held the numerator is measured up to the effective deadline
/// instead of `now`; a breached ticket is always at 100.
pub fn progress_percent(
    calendar: &WorkingCalendar,
    ticket: &Ticket,
    now: NaiveDateTime,
    status: SlaStatus,
) -> f64 {
    if status == SlaStatus::Breached {
        return 100.0;
    }

    let total = calendar.working_hours_between(ticket.created_at, ticket.sla_end_time);
    if total <= 0.0 {
        return 0.0;
    }

    let until = if ticket.is_on_hold {
        ticket.effective_deadline()
    } else {
        now
    };
    let elapsed = calendar.working_hours_between(ticket.created_at, until);
    (100.0 * elapsed / total).clamp(0.0, 100.0)
}

/// Working budget still unused: total budget minus working time elapsed, floored at zero.
pub fn working_time_remaining(
    calendar: &WorkingCalendar,
    ticket: &Ticket,
    now: NaiveDateTime,
) -> Duration {
    let total = calendar.working_time_between(ticket.created_at, ticket.sla_end_time);
    let elapsed = calendar.working_time_between(ticket.created_at, now);
    (total - elapsed).max(Duration::zero())
}

/// `"{h}h {m}m remaining"`, minutes floored
pub fn format_duration_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    format!("{}h {}m remaining", minutes / 60, minutes % 60)
}

/// Wall-clock countdown to a deadline
pub fn format_time_remaining(now: NaiveDateTime, deadline: NaiveDateTime) -> String {
    if deadline <= now {
        return BREACHED_LABEL.to_string();
    }
    format_duration_remaining(deadline - now)
}

/// Everything the list and export need to show about one ticket at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct TicketView {
    pub status: SlaStatus,
    pub progress_percent: f64,
    /// Working budget left, or the breached/on-hold label
    pub time_remaining: String,
    /// Wall-clock countdown to the effective deadline
    pub due_in: String,
    pub effective_deadline: NaiveDateTime,
}

impl TicketView {
    pub fn progress_rounded(&self) -> u8 {
        self.progress_percent.round().clamp(0.0, 100.0) as u8
    }
}

pub(crate) fn view(
    calendar: &WorkingCalendar,
    ticket: &Ticket,
    now: NaiveDateTime,
    required_hours: f64,
) -> TicketView {
    let effective_deadline = ticket.effective_deadline();
    let status = if ticket.is_on_hold {
        SlaStatus::OnHold
    } else {
        classify(now, effective_deadline, required_hours)
    };

    let progress_percent = progress_percent(calendar, ticket, now, status);
    let time_remaining = match status {
        SlaStatus::Breached => BREACHED_LABEL.to_string(),
        SlaStatus::OnHold => ON_HOLD_LABEL.to_string(),
        _ => format_duration_remaining(working_time_remaining(calendar, ticket, now)),
    };
    let due_in = match status {
        SlaStatus::OnHold => ON_HOLD_LABEL.to_string(),
        _ => format_time_remaining(now, effective_deadline),
    };

    TicketView {
        status,
        progress_percent,
        time_remaining,
        due_in,
        effective_deadline,
    }
}
