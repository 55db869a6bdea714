//! Plain-text rendering of the ticket list.
//!
//! Column widths are measured with unicode-width so codes and descriptions
//! containing wide characters still line up.

use crate::data::Ticket;
use crate::sla::{SlaEngine, TicketView};
use chrono::NaiveDateTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const OUTSIDE_HOURS_BANNER: &str = "Outside working hours - SLA timer paused";

/// Upper bound for the description column
pub const DESCRIPTION_MAX_WIDTH: usize = 40;

const SEPARATOR: &str = "  ";

const HEADERS: [&str; 8] = [
    "Ticket",
    "Priority",
    "Status",
    "Progress",
    "Remaining",
    "Due in",
    "Deadline",
    "Description",
];

/// Text alignment inside a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

const ALIGNMENTS: [Alignment; 8] = [
    Alignment::Left,
    Alignment::Left,
    Alignment::Left,
    Alignment::Left,
    Alignment::Right,
    Alignment::Left,
    Alignment::Left,
    Alignment::Left,
];

/// `"Mon, Jan 1, 2024, 10:00 AM"`
pub fn format_date_time(at: NaiveDateTime) -> String {
    at.format("%a, %b %-d, %Y, %-I:%M %p").to_string()
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate text to a maximum display width.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

/// Truncate text with an ellipsis if it exceeds max width.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    match max_width {
        0 => String::new(),
        1 => "…".to_string(),
        _ => format!("{}…", truncate_to_width(text, max_width - 1)),
    }
}

pub fn pad_to_width(text: &str, width: usize, alignment: Alignment) -> String {
    let pad = " ".repeat(width.saturating_sub(display_width(text)));
    match alignment {
        Alignment::Left => format!("{}{}", text, pad),
        Alignment::Right => format!("{}{}", pad, text),
    }
}

/// Cells for one ticket, in header order
pub fn row_cells(ticket: &Ticket, view: &TicketView) -> [String; 8] {
    [
        ticket.ticket_code.clone(),
        format!("{} {}", ticket.priority.code(), ticket.priority.label()),
        view.status.label().to_string(),
        format!("{}%", view.progress_rounded()),
        view.time_remaining.clone(),
        view.due_in.clone(),
        format_date_time(view.effective_deadline),
        truncate_with_ellipsis(&ticket.description, DESCRIPTION_MAX_WIDTH),
    ]
}

/// Render tickets as an aligned table evaluated at `now`
pub fn render_table(engine: &SlaEngine, tickets: &[&Ticket], now: NaiveDateTime) -> String {
    let rows: Vec<[String; 8]> = tickets
        .iter()
        .map(|t| row_cells(t, &engine.view(t, now)))
        .collect();

    let mut widths = HEADERS.map(display_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(str::to_string);
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line = row
            .iter()
            .zip(widths.iter().zip(ALIGNMENTS))
            .map(|(cell, (width, alignment))| pad_to_width(cell, *width, alignment))
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Banner, table, and a count line; the empty state gets its own message
pub fn render_report(engine: &SlaEngine, tickets: &[&Ticket], now: NaiveDateTime) -> String {
    let mut out = String::new();
    if engine.is_outside_working_hours(now) {
        out.push_str(OUTSIDE_HOURS_BANNER);
        out.push_str("\n\n");
    }
    if tickets.is_empty() {
        out.push_str("No tickets found.\n");
        return out;
    }
    out.push_str(&render_table(engine, tickets, now));
    let urgent = tickets
        .iter()
        .filter(|t| engine.view(t, now).status.is_urgent())
        .count();
    out.push_str(&format!("\n{} tickets, {} urgent\n", tickets.len(), urgent));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{NewTicket, Priority};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time(at(1, 10, 0)), "Mon, Jan 1, 2024, 10:00 AM");
        assert_eq!(format_date_time(at(5, 21, 5)), "Fri, Jan 5, 2024, 9:05 PM");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_with_ellipsis("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn test_pad_to_width() {
        assert_eq!(pad_to_width("7%", 4, Alignment::Right), "  7%");
        assert_eq!(pad_to_width("OK", 4, Alignment::Left), "OK  ");
    }

    #[test]
    fn test_banner_outside_working_hours() {
        let engine = SlaEngine::default();
        let report = render_report(&engine, &[], at(6, 12, 0));
        assert!(report.starts_with(OUTSIDE_HOURS_BANNER));
        assert!(report.ends_with("No tickets found.\n"));

        let report = render_report(&engine, &[], at(5, 12, 0));
        assert_eq!(report, "No tickets found.\n");
    }

    #[test]
    fn test_table_columns_line_up() {
        let engine = SlaEngine::default();
        let ticket = Ticket::from_new(
            "1".to_string(),
            NewTicket::open("INC-1", "Mail down", Priority::P1, at(1, 12, 0), at(1, 20, 0)),
        );
        let table = render_table(&engine, &[&ticket], at(1, 13, 0));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Ticket  Priority"));
        assert!(lines[1].starts_with("INC-1   P1 Critical"));
        assert!(lines[1].contains("7h 0m remaining"));
        assert!(lines[1].ends_with("Mail down"));
    }

    #[test]
    fn test_due_in_column_counts_wall_clock() {
        let engine = SlaEngine::default();
        // Friday P4: 30 working hours land on the following Wednesday
        let ticket = Ticket::from_new(
            "1".to_string(),
            NewTicket::open("INC-4", "Badge reader", Priority::P4, at(5, 12, 0), at(10, 18, 0)),
        );
        let view = engine.view(&ticket, at(6, 12, 0));
        let cells = row_cells(&ticket, &view);
        assert_eq!(cells[4], "26h 30m remaining");
        assert_eq!(cells[5], "102h 0m remaining");

        let table = render_table(&engine, &[&ticket], at(6, 12, 0));
        let header = table.lines().next().unwrap();
        assert!(header.contains("Remaining"));
        assert!(header.contains("Due in"));
        assert!(table.contains("102h 0m remaining"));
    }
}
