//! Working time elapsed between two instants.
//!
//! This is the single measure used both for SLA budget consumed and for the
//! debt a hold accrues. Only the parts of each working day that fall inside
//! the working window count.

use super::calendar::WorkingCalendar;
use chrono::{Duration, NaiveDateTime};

/// Convert a duration to fractional hours.
pub fn as_hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

/// Convert fractional hours to a duration, rounded to the millisecond.
pub fn from_hours(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

impl WorkingCalendar {
    /// Working time inside `[start, end)`. Zero when `end <= start`.
    pub fn working_time_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Duration {
        let mut total = Duration::zero();
        let mut current = start;

        while current < end {
            if self.is_working_day(current) {
                let lo = current.max(self.day_window_start(current));
                let hi = end.min(self.day_window_end(current));
                if lo < hi {
                    total = total + (hi - lo);
                }
            }

            let next = self.next_working_day_start(current);
            if next <= current {
                break;
            }
            current = next;
        }

        total
    }

    /// [`working_time_between`](Self::working_time_between) in hours.
    pub fn working_hours_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> f64 {
        as_hours(self.working_time_between(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_reversed_range_is_zero() {
        let cal = WorkingCalendar::default();
        assert_eq!(cal.working_time_between(at(2, 15, 0), at(1, 15, 0)), Duration::zero());
        assert_eq!(cal.working_time_between(at(2, 15, 0), at(2, 15, 0)), Duration::zero());
    }

    #[test]
    fn test_partial_boundary_days() {
        let cal = WorkingCalendar::default();
        // Mon 20:00 -> Tue 13:00 = 1.5h + 1.5h
        assert_eq!(cal.working_hours_between(at(1, 20, 0), at(2, 13, 0)), 3.0);
    }

    #[test]
    fn test_end_before_window_on_first_day() {
        let cal = WorkingCalendar::default();
        assert_eq!(cal.working_hours_between(at(1, 8, 0), at(1, 10, 0)), 0.0);
    }

    #[test]
    fn test_full_week() {
        let cal = WorkingCalendar::default();
        assert_eq!(cal.working_hours_between(at(1, 0, 0), at(8, 0, 0)), 50.0);
    }

    #[test]
    fn test_hours_conversion() {
        assert_eq!(from_hours(1.5), Duration::minutes(90));
        assert_eq!(as_hours(Duration::minutes(45)), 0.75);
    }
}
