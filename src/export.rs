//! CSV export of ticket lists

use crate::data::{timestamp, Ticket};
use crate::sla::SlaEngine;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CSV_HEADERS: [&str; 9] = [
    "Ticket ID",
    "Description",
    "Priority",
    "Created At",
    "SLA Deadline",
    "Effective Deadline",
    "On Hold",
    "Hold Start",
    "Status",
];

/// `tickets-YYYY-MM-DD.csv` for the given day
pub fn default_file_name(now: NaiveDateTime) -> String {
    format!("tickets-{}.csv", now.format("%Y-%m-%d"))
}

fn row(engine: &SlaEngine, ticket: &Ticket, now: NaiveDateTime) -> [String; 9] {
    let view = engine.view(ticket, now);
    [
        ticket.ticket_code.clone(),
        ticket.description.clone(),
        ticket.priority.code().to_string(),
        ticket.created_at.format(timestamp::FORMAT).to_string(),
        ticket.sla_end_time.format(timestamp::FORMAT).to_string(),
        view.effective_deadline.format(timestamp::FORMAT).to_string(),
        if ticket.is_on_hold { "Yes" } else { "No" }.to_string(),
        ticket
            .hold_start
            .map(|at| at.format(timestamp::FORMAT).to_string())
            .unwrap_or_default(),
        view.status.label().to_string(),
    ]
}

/// Write tickets as CSV to any writer. Status is evaluated at `now`.
pub fn write_csv<W: Write>(
    writer: W,
    engine: &SlaEngine,
    tickets: &[&Ticket],
    now: NaiveDateTime,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;
    for ticket in tickets {
        wtr.write_record(row(engine, ticket, now))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(engine: &SlaEngine, tickets: &[&Ticket], now: NaiveDateTime) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, engine, tickets, now)?;
    Ok(String::from_utf8(buf)?)
}

/// Export to `path`, or to the default file name in the current directory
pub fn export_to_file(
    path: Option<&Path>,
    engine: &SlaEngine,
    tickets: &[&Ticket],
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_file_name(now)));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, engine, tickets, now)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Exported {} tickets to {}", tickets.len(), path.display());
    Ok(path)
}
