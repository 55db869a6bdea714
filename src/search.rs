//! Ticket filtering using nucleo
//!
//! The trimmed query is matched as one case-insensitive substring of the
//! ticket code or of the description. The priority filter is ANDed with
//! the text query.

use crate::data::{Priority, Ticket};
use nucleo::{
    pattern::{Atom, AtomKind, CaseMatching, Normalization},
    Config, Matcher, Utf32Str,
};

/// Text query plus optional priority restriction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    pub query: String,
    pub priority: Option<Priority>,
}

impl TicketFilter {
    pub fn new(query: impl Into<String>, priority: Option<Priority>) -> Self {
        Self {
            query: query.into(),
            priority,
        }
    }
}

pub struct TicketSearch {
    matcher: Matcher,
    buf: Vec<char>,
}

impl Default for TicketSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketSearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    fn contains(&mut self, atom: &Atom, haystack: &str) -> bool {
        if haystack.is_empty() {
            return false;
        }
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        atom.score(haystack, &mut self.matcher).is_some()
    }

    /// True if the whole query appears in the code or in the description
    pub fn matches_query(&mut self, ticket: &Ticket, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }

        let atom = Atom::new(
            query,
            CaseMatching::Ignore,
            Normalization::Never,
            AtomKind::Substring,
            false,
        );
        self.contains(&atom, &ticket.ticket_code) || self.contains(&atom, &ticket.description)
    }

    pub fn matches(&mut self, ticket: &Ticket, filter: &TicketFilter) -> bool {
        if filter.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        self.matches_query(ticket, &filter.query)
    }

    /// Tickets passing the filter, input order preserved
    pub fn filter<'a>(&mut self, tickets: &'a [Ticket], filter: &TicketFilter) -> Vec<&'a Ticket> {
        tickets.iter().filter(|t| self.matches(t, filter)).collect()
    }
}
