//! `services`, `roster`, and `schedule` subcommands: sheet maintenance.

use anyhow::{Context, Result};
use booking_engine::admin::{
    add_professional, add_schedule_entry, add_service, remove_professional,
    remove_schedule_entry, remove_service, set_professional_window, toggle_schedule_entry,
    update_service,
};
use booking_engine::contact::format_price;
use booking_engine::schedule::sorted_template;
use booking_engine::wire::{parse_weekday, weekday_name};
use booking_engine::{professional_status, SlotTime};
use chrono::{NaiveDate, Weekday};
use clap::Subcommand;
use serde_json::json;

use crate::{Output, Store};

#[derive(Subcommand)]
pub(crate) enum ServiceAction {
    /// List the service catalogue
    List,
    /// Add a service
    Add {
        #[arg(long)]
        name: String,
        /// Length in minutes
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        price: f64,
    },
    /// Change a service's duration or price
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Remove a service
    Remove {
        #[arg(long)]
        id: u64,
    },
}

#[derive(Subcommand)]
pub(crate) enum RosterAction {
    /// List professionals with their status today
    List,
    /// Add a professional
    Add {
        #[arg(long)]
        name: String,
        /// First working day
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last working day
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Replace a professional's working window; omitted bounds become open
    Window {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Remove a professional
    Remove {
        #[arg(long)]
        id: u64,
    },
}

#[derive(Subcommand)]
pub(crate) enum ScheduleAction {
    /// List the weekly template
    List,
    /// Offer a start time on a weekday
    Add {
        /// Day name, e.g. `segunda` or `monday`
        #[arg(long, value_parser = weekday_arg)]
        weekday: Weekday,
        #[arg(long)]
        time: SlotTime,
    },
    /// Enable or disable an entry
    Toggle {
        #[arg(long)]
        id: u64,
    },
    /// Remove an entry
    Remove {
        #[arg(long)]
        id: u64,
    },
}

fn weekday_arg(raw: &str) -> Result<Weekday, String> {
    parse_weekday(raw).ok_or_else(|| format!("unknown weekday `{raw}`"))
}

fn row_id(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

pub(crate) fn services(store: &Store, action: ServiceAction, out: &Output) -> Result<()> {
    match action {
        ServiceAction::List => {
            let catalogue = store.get().list_services().context("Failed to read services")?;
            if out.json {
                return out.value(&catalogue);
            }
            for s in &catalogue {
                println!(
                    "{:>4}  {:<16} {:>4} min  {}",
                    row_id(s.id),
                    s.name,
                    s.duration.minutes(),
                    format_price(s.price)
                );
            }
        }
        ServiceAction::Add {
            name,
            duration,
            price,
        } => {
            let created = add_service(store.get(), &name, duration, price)
                .context("Service was not added")?;
            store.persist()?;
            out.saved(&created, &format!("Added service {}", created.name))?;
        }
        ServiceAction::Update {
            id,
            duration,
            price,
        } => {
            let updated = update_service(store.get(), id, duration, price)
                .with_context(|| format!("Failed to update service {id}"))?;
            store.persist()?;
            out.saved(&updated, &format!("Updated service {}", updated.name))?;
        }
        ServiceAction::Remove { id } => {
            remove_service(store.get(), id)
                .with_context(|| format!("Failed to remove service {id}"))?;
            store.persist()?;
            println!("Removed service {id}");
        }
    }
    Ok(())
}

pub(crate) fn roster(
    store: &Store,
    action: RosterAction,
    today: NaiveDate,
    out: &Output,
) -> Result<()> {
    match action {
        RosterAction::List => {
            let roster = store
                .get()
                .list_professionals()
                .context("Failed to read professionals")?;
            if out.json {
                let rows: Vec<_> = roster
                    .iter()
                    .map(|p| json!({ "professional": p, "status": professional_status(p, today) }))
                    .collect();
                return out.value(&rows);
            }
            for p in &roster {
                let bound = |d: Option<NaiveDate>| {
                    d.map(|d| d.format("%d/%m/%Y").to_string())
                        .unwrap_or_else(|| "...".to_string())
                };
                println!(
                    "{:>4}  {:<16} {:<9} {} to {}",
                    row_id(p.id),
                    p.name,
                    professional_status(p, today),
                    bound(p.active_from),
                    bound(p.active_until)
                );
            }
        }
        RosterAction::Add { name, from, until } => {
            let created = add_professional(store.get(), &name, from, until)
                .context("Professional was not added")?;
            store.persist()?;
            out.saved(&created, &format!("Added professional {}", created.name))?;
        }
        RosterAction::Window { id, from, until } => {
            let updated = set_professional_window(store.get(), id, from, until)
                .with_context(|| format!("Failed to update professional {id}"))?;
            store.persist()?;
            out.saved(
                &updated,
                &format!(
                    "{} is {} on {}",
                    updated.name,
                    professional_status(&updated, today),
                    today.format("%d/%m/%Y")
                ),
            )?;
        }
        RosterAction::Remove { id } => {
            remove_professional(store.get(), id)
                .with_context(|| format!("Failed to remove professional {id}"))?;
            store.persist()?;
            println!("Removed professional {id}");
        }
    }
    Ok(())
}

pub(crate) fn schedule(store: &Store, action: ScheduleAction, out: &Output) -> Result<()> {
    match action {
        ScheduleAction::List => {
            let template = store
                .get()
                .list_schedule_template()
                .context("Failed to read the schedule")?;
            let template = sorted_template(template);
            if out.json {
                return out.value(&template);
            }
            for e in &template {
                println!(
                    "{:>4}  {:<8} {}  {}",
                    row_id(e.id),
                    weekday_name(e.weekday),
                    e.time,
                    if e.enabled { "on" } else { "off" }
                );
            }
        }
        ScheduleAction::Add { weekday, time } => {
            let created = add_schedule_entry(store.get(), weekday, time)
                .context("Schedule entry was not added")?;
            store.persist()?;
            out.saved(
                &created,
                &format!("Added {} {}", weekday_name(created.weekday), created.time),
            )?;
        }
        ScheduleAction::Toggle { id } => {
            let entry = toggle_schedule_entry(store.get(), id)
                .with_context(|| format!("Failed to toggle schedule entry {id}"))?;
            store.persist()?;
            out.saved(
                &entry,
                &format!(
                    "{} {} is now {}",
                    weekday_name(entry.weekday),
                    entry.time,
                    if entry.enabled { "on" } else { "off" }
                ),
            )?;
        }
        ScheduleAction::Remove { id } => {
            remove_schedule_entry(store.get(), id)
                .with_context(|| format!("Failed to remove schedule entry {id}"))?;
            store.persist()?;
            println!("Removed schedule entry {id}");
        }
    }
    Ok(())
}
