use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use slawatch::config::{self, Config};
use slawatch::data::sorting::{sort_tickets, SortMode};
use slawatch::data::{timestamp, Priority, TicketPatch};
use slawatch::search::{TicketFilter, TicketSearch};
use slawatch::sla::as_hours;
use slawatch::store::FileStore;
use slawatch::tracker::{HoldTransition, TicketForm, TicketTracker};
use slawatch::{export, report, watch};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "slawatch")]
#[command(about = "Track support tickets against working-hours SLA deadlines")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Only tickets whose code or description contain this text
    #[arg(long, short)]
    search: Option<String>,

    /// Only tickets of this priority (P1..P4)
    #[arg(long, short)]
    priority: Option<Priority>,

    /// Ordering: newest, deadline or priority
    #[arg(long, default_value = "newest")]
    sort: SortMode,
}

impl FilterArgs {
    fn filter(&self) -> TicketFilter {
        TicketFilter::new(self.search.clone().unwrap_or_default(), self.priority)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a ticket; its SLA deadline is projected from the creation time
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "P1")]
        priority: Priority,
        /// Creation time (YYYY-MM-DDTHH:MM[:SS]), defaults to now
        #[arg(long)]
        created_at: Option<String>,
    },
    /// List tickets with their SLA status
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Pause the SLA clock of a ticket
    Hold { ticket: String },
    /// Resume a held ticket, pushing its deadline out by the held working time
    Resume { ticket: String },
    /// Hold or resume depending on the current state
    Toggle { ticket: String },
    /// Change the code or description of a ticket
    Edit {
        ticket: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a ticket
    Remove { ticket: String },
    /// Write tickets to a CSV file
    Export {
        /// Output path (defaults to tickets-YYYY-MM-DD.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Live view refreshed every tick and on every store change
    Watch {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so tables on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slawatch=info".parse()?),
        )
        .init();

    if args.init {
        match config::init(args.config.as_deref(), false)? {
            Some(path) => println!("Created config at {}", path.display()),
            None => println!("Config already exists, leaving it untouched"),
        }
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;
    let Some(command) = args.command else {
        return list(&config, &FilterArgs::default());
    };

    match command {
        Command::List { filter } => list(&config, &filter),
        Command::Watch { filter } => {
            let mut tracker = open_tracker(&config)?;
            let options = watch::WatchOptions {
                filter: filter.filter(),
                sort: filter.sort,
                tick: Duration::from_millis(config.watch.tick_millis.max(1)),
                clear_screen: false,
            };
            watch::run(&mut tracker, &options, now).await
        }
        Command::Export { output, filter } => {
            let tracker = loaded_tracker(&config)?;
            let current = now();
            let visible = sort_tickets(
                TicketSearch::new().filter(tracker.tickets(), &filter.filter()),
                filter.sort,
            );
            let path = export::export_to_file(output.as_deref(), tracker.engine(), &visible, current)?;
            println!("Exported {} tickets to {}", visible.len(), path.display());
            Ok(())
        }
        Command::Add {
            code,
            description,
            priority,
            created_at,
        } => {
            let mut tracker = loaded_tracker(&config)?;
            let created_at = created_at
                .as_deref()
                .map(timestamp::parse)
                .transpose()
                .context("Invalid --created-at")?;
            let form = TicketForm {
                ticket_code: code,
                description,
                priority,
                created_at,
            };
            let id = tracker.add_ticket(form, now())?;
            tracker.refresh()?;
            if let Some(ticket) = tracker.find(&id) {
                println!(
                    "Added {} ({} {}, {}h SLA), due {}",
                    ticket.ticket_code,
                    ticket.priority.code(),
                    ticket.priority.label(),
                    tracker.engine().required_hours(ticket.priority),
                    report::format_date_time(ticket.sla_end_time)
                );
            }
            Ok(())
        }
        Command::Hold { ticket } => hold(&config, &ticket, HoldAction::Hold),
        Command::Resume { ticket } => hold(&config, &ticket, HoldAction::Resume),
        Command::Toggle { ticket } => hold(&config, &ticket, HoldAction::Toggle),
        Command::Edit {
            ticket,
            code,
            description,
        } => {
            let mut tracker = loaded_tracker(&config)?;
            let id = resolve(&tracker, &ticket)?;
            let patch = TicketPatch {
                ticket_code: code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
                description: description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                ..TicketPatch::default()
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change: pass --code and/or --description");
            }
            tracker.update_ticket(&id, &patch)?;
            println!("Updated {}", ticket);
            Ok(())
        }
        Command::Remove { ticket } => {
            let mut tracker = loaded_tracker(&config)?;
            let id = resolve(&tracker, &ticket)?;
            tracker.remove_ticket(&id)?;
            println!("Removed {}", ticket);
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HoldAction {
    Hold,
    Resume,
    Toggle,
}

fn hold(config: &Config, reference: &str, action: HoldAction) -> Result<()> {
    let mut tracker = loaded_tracker(config)?;
    let id = resolve(&tracker, reference)?;
    let at = now();
    let transition = match action {
        HoldAction::Hold => tracker.place_on_hold(&id, at)?,
        HoldAction::Resume => tracker.resume(&id, at)?,
        HoldAction::Toggle => tracker.toggle_hold(&id, at)?,
    };

    match transition {
        HoldTransition::Held => println!("{} is on hold, SLA paused", reference),
        HoldTransition::Resumed { debt } => {
            tracker.refresh()?;
            let deadline = tracker
                .find(&id)
                .map(|t| report::format_date_time(t.adjusted_sla_end_time))
                .unwrap_or_default();
            println!(
                "{} resumed after {:.2} working hours on hold, now due {}",
                reference,
                as_hours(debt),
                deadline
            );
        }
        HoldTransition::Unchanged => println!("{} is already in that state", reference),
        HoldTransition::StaleReference => println!("{} no longer exists", reference),
    }
    Ok(())
}

fn list(config: &Config, filter: &FilterArgs) -> Result<()> {
    let tracker = loaded_tracker(config)?;
    let visible = sort_tickets(
        TicketSearch::new().filter(tracker.tickets(), &filter.filter()),
        filter.sort,
    );
    print!("{}", report::render_report(tracker.engine(), &visible, now()));
    Ok(())
}

fn open_tracker(config: &Config) -> Result<TicketTracker<FileStore>> {
    let store = FileStore::open(config.store_path()?)?;
    Ok(TicketTracker::new(store, config.engine()?))
}

fn loaded_tracker(config: &Config) -> Result<TicketTracker<FileStore>> {
    let mut tracker = open_tracker(config)?;
    tracker.refresh()?;
    Ok(tracker)
}

/// Store id for a ticket given by id or ticket code
fn resolve<S: slawatch::store::TicketStore>(tracker: &TicketTracker<S>, reference: &str) -> Result<String> {
    tracker
        .find(reference)
        .map(|t| t.id.clone())
        .with_context(|| format!("No ticket matches '{}'", reference))
}
