//! Test utilities and fixtures for slawatch tests
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use slawatch::data::{NewTicket, Priority, Ticket};
use slawatch::sla::SlaEngine;

/// 2024-01-01 is a Monday, so `jan(1..=5, ..)` is Mon..Fri and 6/7 the weekend.
pub fn jan(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn jan_s(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

/// Default engine: Mon-Fri 11:30-21:30, P1..P4 = 8/12/24/36 working hours
pub fn engine() -> SlaEngine {
    SlaEngine::default()
}

/// A stored ticket with its deadline projected by the default engine
pub fn make_ticket(id: &str, code: &str, priority: Priority, created_at: NaiveDateTime) -> Ticket {
    let deadline = engine().project_deadline(created_at, priority);
    Ticket::from_new(
        id.to_string(),
        NewTicket::open(code, format!("{} description", code), priority, created_at, deadline),
    )
}

pub fn new_ticket(code: &str, priority: Priority, created_at: NaiveDateTime) -> NewTicket {
    let deadline = engine().project_deadline(created_at, priority);
    NewTicket::open(code, format!("{} description", code), priority, created_at, deadline)
}

/// Hours as f64 compared with a small tolerance
pub fn assert_hours(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} hours, got {}",
        expected,
        actual
    );
}
