//! Weekly working calendar.
//!
//! Answers two questions about an instant (is its day a working day, is its
//! time of day inside the working window) and navigates forward to the next
//! moment SLA time can accrue. All instants are naive local date-times.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use thiserror::Error;

/// Errors raised when building a calendar from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("working window start {start} must be before end {end}")]
    EmptyWindow { start: NaiveTime, end: NaiveTime },
    #[error("at least one working day must be configured")]
    NoWorkingDays,
}

/// Working days plus the daily `[start, end)` window during which SLA time accrues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingCalendar {
    /// Indexed by `Weekday::num_days_from_monday`
    days: [bool; 7],
    start: NaiveTime,
    end: NaiveTime,
}

impl Default for WorkingCalendar {
    /// Monday to Friday, 11:30 to 21:30.
    fn default() -> Self {
        Self {
            days: [true, true, true, true, true, false, false],
            start: hm(11, 30),
            end: hm(21, 30),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

impl WorkingCalendar {
    pub fn new(
        working_days: &[Weekday],
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, CalendarError> {
        if start >= end {
            return Err(CalendarError::EmptyWindow { start, end });
        }
        if working_days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }

        let mut days = [false; 7];
        for day in working_days {
            days[day.num_days_from_monday() as usize] = true;
        }

        Ok(Self { days, start, end })
    }

    pub fn window_start(&self) -> NaiveTime {
        self.start
    }

    pub fn window_end(&self) -> NaiveTime {
        self.end
    }

    /// Length of one working window.
    pub fn window_length(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Configured working days, Monday first.
    pub fn working_days(&self) -> Vec<Weekday> {
        let mut day = Weekday::Mon;
        let mut out = Vec::new();
        for enabled in self.days {
            if enabled {
                out.push(day);
            }
            day = day.succ();
        }
        out
    }

    pub fn is_working_day(&self, at: NaiveDateTime) -> bool {
        self.is_working_date(at.date())
    }

    fn is_working_date(&self, date: NaiveDate) -> bool {
        self.days[date.weekday().num_days_from_monday() as usize]
    }

    /// True when the time of day (hour and minute, seconds ignored) lies in
    /// the working window. Does not look at the day of week.
    pub fn is_working_time(&self, at: NaiveDateTime) -> bool {
        let minute = minute_of_day(at.time());
        minute >= minute_of_day(self.start) && minute < minute_of_day(self.end)
    }

    /// Working day and working time at once.
    pub fn is_working_session(&self, at: NaiveDateTime) -> bool {
        self.is_working_day(at) && self.is_working_time(at)
    }

    /// Window start on the instant's own calendar day.
    pub fn day_window_start(&self, at: NaiveDateTime) -> NaiveDateTime {
        at.date().and_time(self.start)
    }

    /// Window end on the instant's own calendar day.
    pub fn day_window_end(&self, at: NaiveDateTime) -> NaiveDateTime {
        at.date().and_time(self.end)
    }

    /// Window start of the first working day strictly after the instant's day.
    pub fn next_working_day_start(&self, at: NaiveDateTime) -> NaiveDateTime {
        let mut date = next_date(at.date());
        // At most six skips: the calendar has at least one working day.
        for _ in 0..7 {
            if self.is_working_date(date) {
                break;
            }
            date = next_date(date);
        }
        date.and_time(self.start)
    }

    /// Earliest instant at or after `at` from which SLA time can accrue.
    ///
    /// On a working day before the window opens this is that day's window
    /// start; anywhere else (including later the same working day, even past
    /// the window end) it is the next working day's window start.
    pub fn next_working_instant(&self, at: NaiveDateTime) -> NaiveDateTime {
        if !self.is_working_day(at) {
            return self.next_working_day_start(at);
        }

        let opens = self.day_window_start(at);
        if at < opens {
            opens
        } else {
            self.next_working_day_start(at)
        }
    }
}

fn next_date(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // January 2024: the 1st is a Monday
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_rejects_inverted_window() {
        let err = WorkingCalendar::new(&[Weekday::Mon], hm(18, 0), hm(9, 0)).unwrap_err();
        assert!(matches!(err, CalendarError::EmptyWindow { .. }));
    }

    #[test]
    fn test_rejects_empty_day_set() {
        let err = WorkingCalendar::new(&[], hm(9, 0), hm(17, 0)).unwrap_err();
        assert_eq!(err, CalendarError::NoWorkingDays);
    }

    #[test]
    fn test_working_time_window_is_half_open() {
        let cal = WorkingCalendar::default();
        assert!(!cal.is_working_time(at(1, 11, 29)));
        assert!(cal.is_working_time(at(1, 11, 30)));
        assert!(cal.is_working_time(at(1, 21, 29)));
        assert!(!cal.is_working_time(at(1, 21, 30)));
    }

    #[test]
    fn test_working_time_ignores_day_of_week() {
        let cal = WorkingCalendar::default();
        // Saturday noon
        assert!(cal.is_working_time(at(6, 12, 0)));
        assert!(!cal.is_working_day(at(6, 12, 0)));
        assert!(!cal.is_working_session(at(6, 12, 0)));
    }

    #[test]
    fn test_working_days_roundtrip() {
        let cal = WorkingCalendar::new(&[Weekday::Sun, Weekday::Wed], hm(8, 0), hm(9, 0)).unwrap();
        assert_eq!(cal.working_days(), vec![Weekday::Wed, Weekday::Sun]);
        assert_eq!(cal.window_length(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_next_working_day_start_skips_weekend() {
        let cal = WorkingCalendar::default();
        assert_eq!(cal.next_working_day_start(at(5, 20, 0)), at(8, 11, 30));
        assert_eq!(cal.next_working_day_start(at(1, 3, 0)), at(2, 11, 30));
    }

    #[test]
    fn test_next_working_instant_after_window_rolls_to_next_day() {
        let cal = WorkingCalendar::default();
        assert_eq!(cal.next_working_instant(at(1, 22, 0)), at(2, 11, 30));
        assert_eq!(cal.next_working_instant(at(1, 10, 0)), at(1, 11, 30));
        assert_eq!(cal.next_working_instant(at(7, 10, 0)), at(8, 11, 30));
    }
}
