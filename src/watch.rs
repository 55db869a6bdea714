//! Live ticket view.
//!
//! Redraws on every clock tick (remaining-time labels move even when nothing
//! is written) and whenever the store pushes a new snapshot.

use crate::data::sorting::{sort_tickets, SortMode};
use crate::report;
use crate::search::{TicketFilter, TicketSearch};
use crate::store::TicketStore;
use crate::tracker::TicketTracker;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::time::Duration;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub filter: TicketFilter,
    pub sort: SortMode,
    pub tick: Duration,
    /// Clear the screen before each frame
    pub clear_screen: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            filter: TicketFilter::default(),
            sort: SortMode::default(),
            tick: Duration::from_millis(1000),
            clear_screen: false,
        }
    }
}

/// One full screen of output
pub fn render_frame<S: TicketStore>(
    tracker: &TicketTracker<S>,
    search: &mut TicketSearch,
    options: &WatchOptions,
    now: NaiveDateTime,
) -> String {
    if tracker.is_loading() {
        return "Loading tickets...\n".to_string();
    }

    let mut out = String::new();
    if let Some(error) = tracker.error() {
        out.push_str(&format!("Error: {}\n\n", error));
    }
    let visible = sort_tickets(search.filter(tracker.tickets(), &options.filter), options.sort);
    out.push_str(&report::render_report(tracker.engine(), &visible, now));
    out
}

/// Run until `shutdown` resolves or the subscription closes
pub async fn run_until<S, W, C, F>(
    tracker: &mut TicketTracker<S>,
    options: &WatchOptions,
    out: &mut W,
    clock: C,
    shutdown: F,
) -> Result<()>
where
    S: TicketStore,
    W: Write,
    C: Fn() -> NaiveDateTime,
    F: Future<Output = ()>,
{
    let mut subscription = tracker
        .store()
        .subscribe()
        .context("Failed to subscribe to ticket store")?;
    let mut search = TicketSearch::new();
    let mut ticker = tokio::time::interval(options.tick);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            event = subscription.next() => match event {
                Some(event) => tracker.apply_event(event),
                None => {
                    tracing::warn!("Ticket subscription closed");
                    break;
                }
            },
            _ = &mut shutdown => break,
        }

        let frame = render_frame(tracker, &mut search, options, clock());
        if options.clear_screen {
            out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        out.write_all(frame.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

/// Watch on stdout until Ctrl-C. The screen is cleared only when stdout is a terminal.
pub async fn run<S, C>(tracker: &mut TicketTracker<S>, options: &WatchOptions, clock: C) -> Result<()>
where
    S: TicketStore,
    C: Fn() -> NaiveDateTime,
{
    let mut stdout = std::io::stdout();
    let options = WatchOptions {
        clear_screen: stdout.is_terminal(),
        ..options.clone()
    };
    run_until(tracker, &options, &mut stdout, clock, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}
