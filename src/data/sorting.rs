//! Ticket ordering.
//!
//! Stores deliver snapshots newest first; the list view can re-sort by
//! deadline or priority.

use super::Ticket;

/// Sort mode for the ticket list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Newest,
    Deadline,
    Priority,
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "created" => Ok(Self::Newest),
            "deadline" => Ok(Self::Deadline),
            "priority" => Ok(Self::Priority),
            other => Err(format!(
                "unknown sort mode '{}' (expected newest, deadline or priority)",
                other
            )),
        }
    }
}

/// Snapshot order: creation instant descending
pub fn sort_newest_first(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Sort ticket references by the given mode. Ties keep their input order.
pub fn sort_tickets(mut tickets: Vec<&Ticket>, mode: SortMode) -> Vec<&Ticket> {
    match mode {
        SortMode::Newest => {
            tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SortMode::Deadline => {
            // Held tickets have no running clock, push them last
            tickets.sort_by_key(|t| (t.is_on_hold, t.effective_deadline()));
        }
        SortMode::Priority => {
            tickets.sort_by_key(|t| t.priority.sort_order());
        }
    }
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{NewTicket, Priority};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn make_ticket(id: &str, priority: Priority, created: NaiveDateTime, deadline: NaiveDateTime) -> Ticket {
        Ticket::from_new(
            id.to_string(),
            NewTicket::open(format!("TEST-{}", id), "desc", priority, created, deadline),
        )
    }

    #[test]
    fn test_sort_newest_first() {
        let mut tickets = vec![
            make_ticket("1", Priority::P1, at(1, 12), at(1, 20)),
            make_ticket("2", Priority::P1, at(3, 12), at(3, 20)),
            make_ticket("3", Priority::P1, at(2, 12), at(2, 20)),
        ];
        sort_newest_first(&mut tickets);
        let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_by_deadline_puts_held_last() {
        let mut held = make_ticket("1", Priority::P1, at(1, 12), at(1, 13));
        held.is_on_hold = true;
        held.hold_start = Some(at(1, 12));
        let late = make_ticket("2", Priority::P1, at(1, 12), at(4, 20));
        let soon = make_ticket("3", Priority::P1, at(1, 12), at(2, 20));

        let sorted = sort_tickets(vec![&held, &late, &soon], SortMode::Deadline);
        let ids: Vec<_> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_by_priority() {
        let low = make_ticket("1", Priority::P4, at(1, 12), at(1, 20));
        let urgent = make_ticket("2", Priority::P1, at(1, 12), at(1, 20));
        let medium = make_ticket("3", Priority::P3, at(1, 12), at(1, 20));

        let sorted = sort_tickets(vec![&low, &urgent, &medium], SortMode::Priority);
        let ids: Vec<_> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!("Deadline".parse::<SortMode>(), Ok(SortMode::Deadline));
        assert!("random".parse::<SortMode>().is_err());
    }
}
