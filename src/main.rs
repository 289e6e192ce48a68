use crate::api::HttpLeadsApi;
use crate::config::AppConfig;
use crate::domain::serde_helpers::parse_timestamp;
use crate::domain::{
    current_follow_up, is_follow_up_due, next_follow_up, sorted_call_logs, CallLogUpdate, CallOutcome, Filters,
    Lead, LeadPatch, LeadStatus, NewCallLog, NewLead, SortDirection, SortField, SortState,
};
use crate::errors::DashError;
use crate::storage::{init_db, Database, LocalStore};
use crate::store::LeadStore;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod api;
mod config;
mod domain;
mod errors;
mod packaging;
mod storage;
mod store;


#[derive(Parser)]
#[command(name = "rankrent")]
#[command(about = "Work the lead list: areas, sorting, call logging and follow-ups")]
struct Cli {
    /// Backend base URL (the `/leads` routes hang off it)
    #[arg(long, global = true, env = config::API_URL_ENV)]
    api_url: Option<String>,

    /// SQLite file used as local storage
    #[arg(long, global = true, env = config::STORAGE_ENV)]
    storage: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List areas (one per city) with lead counts
    Areas,
    /// Make an area the active one
    UseArea { id: String },
    /// Show the active area's leads in the saved view
    Leads {
        /// Switch to this area first
        #[arg(long)]
        area: Option<String>,
        /// Only contacted leads from now on
        #[arg(long, conflicts_with = "all")]
        contacted_only: bool,
        /// Every lead from now on
        #[arg(long)]
        all: bool,
        /// name | reviews | phone | website (default: reviews, descending)
        #[arg(long)]
        sort: Option<SortField>,
        /// Descending order for --sort
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Click a column header: same field flips direction, a new one sorts ascending
    Sort {
        #[arg(required_unless_present = "clear")]
        field: Option<SortField>,
        /// Back to store order
        #[arg(long, conflicts_with = "field")]
        clear: bool,
    },
    /// Flip the contacted-only filter
    ToggleFilter,
    /// Create a lead
    AddLead {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        reviews: i64,
        /// new | contacted | qualified | converted | lost
        #[arg(long, default_value = "new")]
        status: LeadStatus,
    },
    /// Change fields of a lead; an empty value clears an optional field
    EditLead {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        status: Option<LeadStatus>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        reviews: Option<i64>,
    },
    /// Flip a lead's contacted flag
    Toggle { id: String },
    /// Delete a lead
    Delete { id: String },
    /// Start a call from a row of the `leads` listing (same saved view); the row is remembered
    StartCall { row: usize },
    /// Record a call outcome on a lead
    LogCall {
        id: String,
        #[arg(long)]
        outcome: CallOutcome,
        #[arg(long, default_value = "")]
        notes: String,
        /// Explicit follow-up time (RFC 3339), overrides the outcome schedule
        #[arg(long, value_parser = parse_when)]
        next: Option<DateTime<Utc>>,
        /// Call length in seconds
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Edit a recorded call
    EditCall {
        id: String,
        log_id: String,
        #[arg(long)]
        outcome: Option<CallOutcome>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a recorded call
    DeleteCall { id: String, log_id: String },
    /// Show a lead's call history, newest first
    Calls { id: String },
    /// Leads whose latest follow-up is due
    Due,
    /// When a call logged now with this outcome would come due
    FollowUp { outcome: String },
    /// Copy static-host routing files into the build output
    CopyStatic {
        #[arg(long, default_value = "public")]
        from: PathBuf,
        #[arg(long, default_value = "dist")]
        to: PathBuf,
    },
    /// Forget cached view state (call logs are kept)
    ClearCache,
}

/// `Some("")` clears the field, `None` leaves it alone.
fn nullable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
}

fn parse_when(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp '{raw}'"))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env().with_overrides(cli.api_url.clone(), cli.storage.clone());

    match run(cli.command, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn open_store(cfg: &AppConfig) -> Result<LeadStore<HttpLeadsApi>, DashError> {
    let db = Database::new(cfg.storage_path.clone());
    init_db(&db)?;
    let local = LocalStore::new(db);
    let api = HttpLeadsApi::new(&cfg.api_base_url, local.clone())?;

    let mut store = LeadStore::new(api, local);
    store.init();
    Ok(store)
}

/// Load and turn a swallowed load failure back into an error for the CLI.
fn loaded(cfg: &AppConfig) -> Result<LeadStore<HttpLeadsApi>, DashError> {
    let mut store = open_store(cfg)?;
    store.load();
    if let Some(err) = store.error() {
        return Err(DashError::Network(format!("could not load leads: {err}")));
    }
    Ok(store)
}

fn run(command: Command, cfg: &AppConfig) -> Result<(), DashError> {
    let now = Utc::now();

    match command {
        Command::Areas => {
            let store = loaded(cfg)?;
            let current = store.current_area().map(str::to_string);
            {
                let areas = store.areas();
                for area in &areas {
                    let marker = if current.as_deref() == Some(area.id.as_str()) { "*" } else { " " };
                    println!("{marker} {:<28} {:<28} {:>4} leads", area.id, area.name, area.leads.len());
                }
                println!("{} leads in {} areas", store.leads().len(), areas.len());
            }
            store.dispose();
        }
        Command::UseArea { id } => {
            let mut store = open_store(cfg)?;
            store.set_current_area(&id)?;
            println!("Active area: {id}");
            store.dispose();
        }
        Command::Leads {
            area,
            contacted_only,
            all,
            sort,
            desc,
        } => {
            let mut store = loaded(cfg)?;
            if let Some(area) = area.filter(|a| store.current_area() != Some(a.as_str())) {
                store.set_current_area(&area)?;
            }
            if contacted_only || all {
                store.set_filters(Filters {
                    show_contacted_only: contacted_only,
                });
            }
            if let Some(field) = sort {
                store.set_sort(SortState {
                    field: Some(field),
                    direction: if desc { SortDirection::Desc } else { SortDirection::Asc },
                });
            }

            let Some(area) = store.current_area().map(str::to_string) else {
                println!("No leads yet.");
                return Ok(());
            };
            let resume = store.take_last_called_index();
            let scope = if store.filters().show_contacted_only { "contacted" } else { "all" };
            let sort_label = store.sort().to_string();
            let rows = store.displayed_leads();
            println!("Area {area}: {} leads ({scope}, {sort_label})", rows.len());
            for (i, lead) in rows.iter().enumerate() {
                let marker = if resume == Some(i) { ">" } else { " " };
                print_lead_row(marker, i, lead, now);
            }
            store.dispose();
        }
        Command::Sort { field, clear } => {
            let mut store = open_store(cfg)?;
            if store.current_area().is_none() {
                return Err(DashError::BadRequest("no area selected".into()));
            }
            match field {
                Some(field) if !clear => store.handle_sort(field),
                _ => store.clear_sort(),
            }
            println!("Sort: {}", store.sort());
            store.dispose();
        }
        Command::ToggleFilter => {
            let mut store = open_store(cfg)?;
            if store.current_area().is_none() {
                return Err(DashError::BadRequest("no area selected".into()));
            }
            store.toggle_contacted_only();
            let scope = if store.filters().show_contacted_only { "contacted only" } else { "all leads" };
            println!("Showing {scope}");
            store.dispose();
        }
        Command::AddLead {
            name,
            phone,
            city,
            email,
            company,
            website,
            reviews,
            status,
        } => {
            let mut store = open_store(cfg)?;
            let lead = store.create(&NewLead {
                name,
                phone,
                email,
                company,
                website,
                city,
                status,
                reviews,
                ..NewLead::default()
            })?;
            println!(
                "✅ Created lead {} ({}, {}, {})",
                lead.id,
                lead.name,
                lead.city,
                lead.status.as_str()
            );
        }
        Command::EditLead {
            id,
            name,
            phone,
            city,
            email,
            company,
            website,
            status,
            notes,
            reviews,
        } => {
            let patch = LeadPatch {
                name,
                phone,
                email: nullable(email),
                company: nullable(company),
                website: nullable(website),
                city: nullable(city),
                status,
                reviews,
                notes: nullable(notes),
                ..LeadPatch::default()
            };
            if patch.is_empty() {
                return Err(DashError::BadRequest("nothing to change".into()));
            }
            let mut store = loaded(cfg)?;
            let lead = store.update(&id, &patch)?;
            println!(
                "✅ Updated lead {} ({}, {}, {})",
                lead.id,
                lead.name,
                lead.city,
                lead.status.as_str()
            );
        }
        Command::Toggle { id } => {
            let mut store = loaded(cfg)?;
            let contacted = store.toggle_contacted(&id)?;
            println!("Lead {id} contacted: {contacted}");
        }
        Command::Delete { id } => {
            let mut store = open_store(cfg)?;
            store.delete(&id)?;
            println!("🗑  Deleted lead {id}");
        }
        Command::StartCall { row } => {
            let mut store = loaded(cfg)?;
            let (name, phone) = {
                let rows = store.displayed_leads();
                let lead = rows
                    .get(row)
                    .ok_or_else(|| DashError::NotFound(format!("row {row}")))?;
                (lead.name.clone(), lead.phone.clone())
            };
            store.set_last_called_index(row)?;
            println!("📞 Calling {name} at {phone}");
            store.dispose();
        }
        Command::LogCall {
            id,
            outcome,
            notes,
            next,
            duration,
        } => {
            let mut store = loaded(cfg)?;
            let mut input = NewCallLog::new(outcome, notes);
            input.next_follow_up = next;
            input.duration = duration;

            let entry = store.add_call_log(&id, input, now)?;
            store.refresh_quietly();
            println!("✅ Logged {} on lead {id} ({})", entry.id, outcome.label());
            if let Some(at) = entry.next_follow_up {
                println!("   Next follow-up: {}", at.to_rfc3339());
            }
            store.dispose();
        }
        Command::EditCall {
            id,
            log_id,
            outcome,
            notes,
        } => {
            let mut store = loaded(cfg)?;
            let entry = store.update_call_log(&id, &log_id, CallLogUpdate { outcome, notes }, now)?;
            println!("✅ Updated {} ({})", entry.id, entry.outcome.label());
        }
        Command::DeleteCall { id, log_id } => {
            let mut store = loaded(cfg)?;
            store.delete_call_log(&id, &log_id)?;
            println!("🗑  Removed {log_id} from lead {id}");
        }
        Command::Calls { id } => {
            let store = loaded(cfg)?;
            let lead = store
                .lead(&id)
                .ok_or_else(|| DashError::NotFound(format!("lead {id}")))?;
            println!("{} ({})", lead.name, lead.phone);
            for entry in sorted_call_logs(&lead.call_logs) {
                let next = entry
                    .next_follow_up
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<18} {}  {:<24} next {}  {}",
                    entry.id,
                    entry.call_date.format("%Y-%m-%d %H:%M"),
                    entry.outcome.label(),
                    next,
                    entry.notes
                );
            }
        }
        Command::Due => {
            let store = loaded(cfg)?;
            let due = store.due_leads(now);
            if due.is_empty() {
                println!("Nothing due.");
            }
            for lead in due {
                let at = current_follow_up(lead)
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("⏰ {:<10} {:<30} {:<16} due {at}", lead.id, lead.name, lead.phone);
            }
        }
        Command::FollowUp { outcome } => match next_follow_up(&outcome, now) {
            Some(at) => println!("{outcome}: follow up {}", at.format("%Y-%m-%d %H:%M")),
            None => println!("{outcome}: no follow-up scheduled"),
        },
        Command::CopyStatic { from, to } => {
            let report = packaging::copy_static_files(&from, &to);
            println!(
                "Copied {}, skipped {}, failed {}",
                report.copied.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
        Command::ClearCache => {
            let mut store = open_store(cfg)?;
            store.clear_cache();
            println!("Cache cleared.");
        }
    }

    Ok(())
}

fn print_lead_row(marker: &str, index: usize, lead: &Lead, now: DateTime<Utc>) {
    let due = if is_follow_up_due(lead, now) { "⏰" } else { "  " };
    let contacted = if lead.contacted { "✓" } else { " " };
    println!(
        "{marker}{index:>3} {due} [{contacted}] {:<10} {:<30} {:<16} {:>5}  {:<28} {}",
        lead.id,
        lead.name,
        lead.phone,
        lead.display_reviews(),
        lead.website.as_deref().unwrap_or("-"),
        lead.note_preview().unwrap_or("")
    );
}
