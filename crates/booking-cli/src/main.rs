//! `agenda` CLI: check availability, book, and report against an appointment sheet.
//!
//! ## Usage
//!
//! ```sh
//! # Free start times for Ana on a Monday, sized for the "Corte" service
//! agenda -i sheet.json slots --date 2026-03-16 --professional Ana --service Corte
//!
//! # Is a two-hour request at 10:00 free?
//! agenda -i sheet.json check --date 2026-03-16 --time 10:00 --professional Ana --duration 120
//!
//! # Book (writes back to sheet.json)
//! agenda -i sheet.json book --name "Bia Souza" --phone 11987654321 --email bia@example.com \
//!     --service Corte --professional Ana --date 2026-03-16 --time 09:00
//!
//! # Dashboard numbers and a monthly report, as JSON
//! agenda -i sheet.json --json overview
//! agenda -i sheet.json report --period month
//!
//! # Move a booking to 11:00, then list Ana's bookings on that day
//! agenda -i sheet.json edit --id 2 --time 11:00
//! agenda -i sheet.json list --date 2026-03-16 --professional Ana
//!
//! # Sheet maintenance
//! agenda -i sheet.json services add --name Barba --duration 30 --price 35
//! agenda -i sheet.json roster window --id 3 --from 2026-04-01
//! agenda -i sheet.json schedule toggle --id 6
//!
//! # Against the live sheet API instead of an export
//! AGENDA_STORE_URL=https://api.sheety.co/<id>/agendabeta agenda slots --date 2026-03-16 --professional Ana
//! ```
//!
//! Configuration is layered: defaults, then `--config <file>`, then `AGENDA_*`
//! variables, then `--store-url`.
//!
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

mod admin;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use booking_engine::availability::is_slot_available;
use booking_engine::booking::{
    check_professional, commit_booking, edit_booking, plan_day, plan_day_for, resolve_duration,
    upcoming_for_client, BookingEdit,
};
use booking_engine::contact::{confirmation_message, format_phone, format_price, whatsapp_url};
use booking_engine::report::{
    filter_bookings, newest_first, upcoming, Overview, PeriodReport, ReportPeriod,
};
use booking_engine::{
    Booking, BookingRequest, BookingStore, DayPlan, EngineConfig, EngineError, MemoryStore,
    ServiceDuration, SheetyStore, SlotTime, Snapshot,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::admin::{RosterAction, ScheduleAction, ServiceAction};

/// Exit code for a booking that lost its slot between offer and commit.
const EXIT_SLOT_TAKEN: i32 = 2;

#[derive(Parser)]
#[command(
    name = "agenda",
    version,
    about = "Appointment availability, booking, and reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Sheet export (JSON) to read and write instead of the remote API
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Base URL of the sheet API
    #[arg(long, env = "AGENDA_STORE_URL", global = true)]
    store_url: Option<String>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List free start times for a professional on a date
    Slots {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        professional: String,
        /// Size the request by this service's duration
        #[arg(long)]
        service: Option<String>,
        /// Size the request by an explicit duration in minutes
        #[arg(long, conflicts_with = "service")]
        duration: Option<u32>,
    },
    /// Check whether one start time is free
    Check {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: SlotTime,
        #[arg(long)]
        professional: String,
        #[arg(long)]
        service: Option<String>,
        #[arg(long, conflicts_with = "service")]
        duration: Option<u32>,
    },
    /// Check whether a professional takes bookings on a date
    Professional {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Validate, re-check, and create a booking
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        professional: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: SlotTime,
    },
    /// Upcoming bookings for a client phone number
    History {
        #[arg(long)]
        phone: String,
    },
    /// Dashboard headline numbers and the next bookings
    Overview,
    /// Totals and top clients for a period
    Report {
        #[arg(long, value_enum, default_value_t = PeriodArg::Month)]
        period: PeriodArg,
        #[arg(long, required_if_eq("period", "custom"))]
        from: Option<NaiveDate>,
        #[arg(long, required_if_eq("period", "custom"))]
        to: Option<NaiveDate>,
    },
    /// Bookings newest first, optionally narrowed to a day or professional
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        professional: Option<String>,
    },
    /// Change fields of an existing booking; moving it re-checks the slot
    Edit {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// New service; the price follows it unless --price is given
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        professional: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        time: Option<SlotTime>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete a booking by id
    Delete {
        #[arg(long)]
        id: u64,
    },
    /// Manage the service catalogue
    Services {
        #[command(subcommand)]
        action: ServiceAction,
    },
    /// Manage professionals and their working windows
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },
    /// Manage the weekly schedule template
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Today,
    Week,
    Month,
    Custom,
}

/// Where bookings live for this run.
enum Store {
    File { store: MemoryStore, path: PathBuf },
    Remote(SheetyStore),
}

impl Store {
    fn open(input: Option<&Path>, config: &EngineConfig) -> Result<Self> {
        if let Some(path) = input {
            let store = MemoryStore::from_file(path)
                .with_context(|| format!("Failed to load sheet: {}", path.display()))?;
            return Ok(Store::File {
                store,
                path: path.to_path_buf(),
            });
        }
        if config.store_url.is_some() {
            let remote =
                SheetyStore::from_config(config).context("Failed to build sheet API client")?;
            return Ok(Store::Remote(remote));
        }
        bail!("No store configured: pass --input <file> or --store-url <url>");
    }

    fn get(&self) -> &dyn BookingStore {
        match self {
            Store::File { store, .. } => store,
            Store::Remote(remote) => remote,
        }
    }

    /// Write local changes back; the remote store persists on each call.
    fn persist(&self) -> Result<()> {
        if let Store::File { store, path } = self {
            store
                .save(path)
                .with_context(|| format!("Failed to write sheet: {}", path.display()))?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config =
        EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.store_url.as_ref().filter(|url| !url.trim().is_empty()) {
        config.store_url = Some(url.clone());
    }

    let store = Store::open(cli.input.as_deref(), &config)?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Slots {
            date,
            professional,
            service,
            duration,
        } => {
            let plan = match duration {
                Some(minutes) => {
                    let duration = ServiceDuration::from_minutes(minutes)?;
                    match Snapshot::fetch(store.get()) {
                        Ok(snapshot) => plan_day_for(&snapshot, date, &professional, duration),
                        Err(err) => {
                            warn!(error = %err, "store read failed, offering no slots");
                            DayPlan::StoreUnavailable
                        }
                    }
                }
                None => plan_day(store.get(), date, &professional, service.as_deref(), &config),
            };
            if let Some(notice) = plan.notice() {
                eprintln!("{notice}");
            }
            if out.json {
                out.value(&plan)?;
            } else {
                for slot in plan.slots() {
                    println!("{slot}");
                }
            }
        }
        Commands::Check {
            date,
            time,
            professional,
            service,
            duration,
        } => {
            let available = match Snapshot::fetch(store.get()) {
                Ok(snapshot) => {
                    let length = match duration {
                        Some(minutes) => ServiceDuration::from_minutes(minutes)?,
                        None => resolve_duration(&snapshot, service.as_deref(), &config),
                    };
                    is_slot_available(date, time, &professional, length, &snapshot.bookings)
                }
                Err(err) => {
                    warn!(error = %err, "store read failed");
                    eprintln!("could not load bookings, please try again");
                    false
                }
            };
            out.verdict(available)?;
        }
        Commands::Professional { name, date } => {
            let available = check_professional(store.get(), &name, date);
            out.verdict(available)?;
        }
        Commands::Book {
            name,
            phone,
            email,
            service,
            professional,
            date,
            time,
        } => {
            let request = BookingRequest {
                client_name: name,
                phone,
                email,
                service,
                professional,
                date,
                time,
            };
            match commit_booking(store.get(), &request, today, &config) {
                Ok(created) => {
                    store.persist()?;
                    let message = confirmation_message(&created);
                    if out.json {
                        out.value(&json!({
                            "booking": created,
                            "whatsapp_url": whatsapp_url(&config.whatsapp_number, &message),
                        }))?;
                    } else {
                        println!("{message}");
                        println!();
                        println!("{}", whatsapp_url(&config.whatsapp_number, &message));
                    }
                }
                Err(EngineError::SlotTaken { .. }) => {
                    eprintln!("slot no longer available, please reselect");
                    let fresh = plan_day(
                        store.get(),
                        request.date,
                        &request.professional,
                        Some(&request.service),
                        &config,
                    );
                    for slot in fresh.slots() {
                        println!("{slot}");
                    }
                    process::exit(EXIT_SLOT_TAKEN);
                }
                Err(err) => return Err(err).context("Booking was not created"),
            }
        }
        Commands::History { phone } => {
            let bookings = read_bookings(&store);
            let found = upcoming_for_client(&bookings, &phone, today);
            if out.json {
                out.value(&found)?;
            } else if found.is_empty() {
                println!("No upcoming bookings for {}", format_phone(&phone));
            } else {
                for b in found {
                    println!(
                        "{} {} {} with {} ({})",
                        b.date.format("%d/%m/%Y"),
                        b.time,
                        b.service,
                        b.professional,
                        format_price(b.price)
                    );
                }
            }
        }
        Commands::Overview => {
            let bookings = read_bookings(&store);
            let overview = Overview::compute(&bookings, today);
            let now = match cli.today {
                Some(day) => day.and_time(NaiveTime::MIN),
                None => Local::now().naive_local(),
            };
            let next = upcoming(&bookings, now, config.upcoming_limit);
            if out.json {
                out.value(&json!({ "overview": overview, "upcoming": next }))?;
            } else {
                println!("Bookings today:  {}", overview.today_count);
                println!("Revenue today:   {}", format_price(overview.today_revenue));
                println!("Revenue (month): {}", format_price(overview.month_revenue));
                println!("Clients:         {}", overview.unique_clients);
                print_upcoming(&next, now);
            }
        }
        Commands::Report { period, from, to } => {
            let period = match (period, from, to) {
                (PeriodArg::Today, ..) => ReportPeriod::Today,
                (PeriodArg::Week, ..) => ReportPeriod::Week,
                (PeriodArg::Month, ..) => ReportPeriod::Month,
                (PeriodArg::Custom, Some(from), Some(to)) => ReportPeriod::Custom { from, to },
                (PeriodArg::Custom, ..) => bail!("--period custom needs --from and --to"),
            };
            let (from, to) = period.resolve(today)?;
            let bookings = read_bookings(&store);
            let report = PeriodReport::compute(&bookings, from, to, config.top_clients);
            if out.json {
                out.value(&report)?;
            } else {
                println!(
                    "Period:         {} to {}",
                    report.from.format("%d/%m/%Y"),
                    report.to.format("%d/%m/%Y")
                );
                println!("Bookings:       {}", report.total);
                println!("Revenue:        {}", format_price(report.revenue));
                println!("Average ticket: {}", format_price(report.average_ticket));
                if !report.top_clients.is_empty() {
                    println!("Top clients:");
                    for client in &report.top_clients {
                        println!(
                            "  {} - {} ({})",
                            client.name,
                            format_phone(&client.phone),
                            client.count
                        );
                    }
                }
            }
        }
        Commands::List { date, professional } => {
            let bookings = read_bookings(&store);
            let matching: Vec<Booking> = filter_bookings(&bookings, date, professional.as_deref())
                .into_iter()
                .cloned()
                .collect();
            let sorted = newest_first(&matching);
            if out.json {
                out.value(&sorted)?;
            } else {
                for b in sorted {
                    let id = b.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
                    println!(
                        "{id:>4}  {} {}  {:<20} {:<16} {:<12} {:<10} {}",
                        b.date.format("%d/%m/%Y"),
                        b.time,
                        b.client_name,
                        format_phone(&b.phone),
                        b.service,
                        b.professional,
                        format_price(b.price)
                    );
                }
            }
        }
        Commands::Delete { id } => {
            store
                .get()
                .delete_booking(id)
                .with_context(|| format!("Failed to delete booking {id}"))?;
            store.persist()?;
            println!("Deleted booking {id}");
        }
        Commands::Edit {
            id,
            name,
            phone,
            email,
            service,
            professional,
            date,
            time,
            price,
        } => {
            let edit = BookingEdit {
                client_name: name,
                phone,
                email,
                service,
                professional,
                date,
                time,
                price,
            };
            match edit_booking(store.get(), id, &edit, &config) {
                Ok(updated) => {
                    store.persist()?;
                    out.saved(
                        &updated,
                        &format!(
                            "Booking {id}: {} {} {} with {} ({})",
                            updated.date.format("%d/%m/%Y"),
                            updated.time,
                            updated.service,
                            updated.professional,
                            format_price(updated.price)
                        ),
                    )?;
                }
                Err(EngineError::SlotTaken { .. }) => {
                    eprintln!("slot no longer available, please reselect");
                    process::exit(EXIT_SLOT_TAKEN);
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("Booking {id} was not changed"))
                }
            }
        }
        Commands::Services { action } => admin::services(&store, action, &out)?,
        Commands::Roster { action } => admin::roster(&store, action, today, &out)?,
        Commands::Schedule { action } => admin::schedule(&store, action, &out)?,
    }

    Ok(())
}

/// Dashboard reads degrade to an empty list with a notice.
fn read_bookings(store: &Store) -> Vec<Booking> {
    store.get().list_bookings().unwrap_or_else(|err| {
        warn!(error = %err, "store read failed");
        eprintln!("could not load bookings, please try again");
        Vec::new()
    })
}

fn print_upcoming(next: &[&Booking], now: NaiveDateTime) {
    if next.is_empty() {
        println!("No bookings after {}", now.format("%d/%m/%Y %H:%M"));
        return;
    }
    println!("Next bookings:");
    for b in next {
        println!(
            "  {} {}  {} - {} ({})",
            b.date.format("%d/%m/%Y"),
            b.time,
            b.client_name,
            b.service,
            b.professional
        );
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn value<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a written record as JSON, or `message` as text.
    fn saved<T: Serialize>(&self, record: &T, message: &str) -> Result<()> {
        if self.json {
            self.value(record)
        } else {
            println!("{message}");
            Ok(())
        }
    }

    fn verdict(&self, available: bool) -> Result<()> {
        if self.json {
            self.value(&json!({ "available": available }))
        } else {
            println!("{}", if available { "available" } else { "unavailable" });
            Ok(())
        }
    }
}
