//! SLA budgets per priority and deadline projection.

use super::accumulator::{as_hours, from_hours};
use super::calendar::WorkingCalendar;
use crate::data::Priority;
use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("SLA hours for {priority} must be positive, got {hours}")]
pub struct InvalidSlaHours {
    pub priority: Priority,
    pub hours: f64,
}

/// Required working hours for every priority class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaPolicy {
    hours: [f64; 4],
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            hours: [8.0, 12.0, 24.0, 36.0],
        }
    }
}

impl SlaPolicy {
    pub fn new(p1: f64, p2: f64, p3: f64, p4: f64) -> Result<Self, InvalidSlaHours> {
        let hours = [p1, p2, p3, p4];
        for (priority, h) in Priority::all().zip(hours) {
            if !(h.is_finite() && h > 0.0) {
                return Err(InvalidSlaHours { priority, hours: h });
            }
        }
        Ok(Self { hours })
    }

    pub fn required_hours(&self, priority: Priority) -> f64 {
        self.hours[priority.sort_order() as usize]
    }

    pub fn required_time(&self, priority: Priority) -> Duration {
        from_hours(self.required_hours(priority))
    }
}

impl WorkingCalendar {
    /// Walk forward from `created_at` consuming `required` working time.
    ///
    /// The result can sit exactly on a window end when the budget runs out
    /// there; it is never moved on to the next window.
    pub fn project_deadline(&self, created_at: NaiveDateTime, required: Duration) -> NaiveDateTime {
        let mut current = created_at;
        if !self.is_working_session(current) {
            current = self.next_working_instant(current);
        }

        let mut left = required;
        while left > Duration::zero() {
            if !self.is_working_day(current) {
                let next = self.next_working_day_start(current);
                if next <= current {
                    break;
                }
                current = next;
                continue;
            }

            let available = self.day_window_end(current) - current;
            if available > Duration::zero() {
                let step = available.min(left);
                current = current + step;
                left = left - step;
            } else {
                let next = self.next_working_day_start(current);
                if next <= current {
                    break;
                }
                current = next;
            }
        }

        tracing::trace!(
            "Projected {:.2}h from {} to {}",
            as_hours(required),
            created_at,
            current
        );
        current
    }
}
