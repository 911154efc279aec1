//! `fieldlog` - CLI for the fieldlog incident logbook
//!
//! This binary provides the command-line front end: writing notes, filling
//! in EMT and fire incident forms, browsing history, and running the
//! health check backend.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;

use fieldlog::cli::{
    fire_filter, Cli, Command, ConfigCommand, DraftCommand, DraftKind, EmtCommand, FireCommand,
    NoteCommand, OutputFormat, ServeCommand,
};
use fieldlog::filter::{collect_tags, collect_units, Match};
use fieldlog::record::{Location, TimelineEvent};
use fieldlog::{
    init_logging, Config, EmtIncident, EmtReport, FireIncident, FireReport, Logbook, Note, Storage,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Note(cmd) => handle_note(&mut open_logbook(config)?, cmd),
        Command::Emt(cmd) => handle_emt(&mut open_logbook(config)?, cmd),
        Command::Fire(cmd) => handle_fire(&mut open_logbook(config)?, cmd),
        Command::Draft(cmd) => handle_draft(&mut open_logbook(config)?, &cmd),
        Command::Status(cmd) => handle_status(&open_logbook(config)?, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Serve(cmd) => handle_serve(&config, &cmd),
    }
}

fn open_logbook(config: Config) -> Result<Logbook> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("failed to open storage at {}", path.display()))?;
    Ok(Logbook::open(storage, config)?)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// === Notes ===

fn handle_note(book: &mut Logbook, cmd: NoteCommand) -> Result<()> {
    match cmd {
        NoteCommand::Add {
            title,
            content,
            tags,
            lat,
            lng,
        } => {
            if content.trim().is_empty() {
                bail!("note content must not be empty");
            }
            let location = lat.zip(lng).map(|(lat, lng)| Location { lat, lng });
            let view = book.save_note(Note::new(&title, &content, tags, location))?;
            println!("Saved note ({view})");
        }
        NoteCommand::List { filter, format } => {
            let filter = filter.to_filter(book.config().incidents.default_sort);
            let matches = filter.apply(book.notes(), &Local::now());
            match format {
                OutputFormat::Json => print_json(&records(&matches))?,
                OutputFormat::Plain => {
                    for m in &matches {
                        let note = m.record;
                        let title = if note.title.is_empty() {
                            "(untitled)"
                        } else {
                            note.title.as_str()
                        };
                        println!("{}  {}  {}", note.id, local_time(note.timestamp), title);
                    }
                    println!("{} of {} notes", matches.len(), book.notes().len());
                }
            }
        }
        NoteCommand::Show { id, format } => {
            let note = book
                .note(&id)
                .ok_or_else(|| fieldlog::Error::record_not_found("note", &id))?;
            match format {
                OutputFormat::Json => print_json(note)?,
                OutputFormat::Plain => print_note(note),
            }
        }
        NoteCommand::Delete { id } => {
            book.delete_note(&id)?;
            println!("Deleted note {id}");
        }
        NoteCommand::Export { output } => {
            let json = book.export_notes()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Exported {} notes to {}", book.notes().len(), path.display());
                }
                None => println!("{json}"),
            }
        }
        NoteCommand::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let added = book.import_notes(&raw)?;
            println!("Imported {added} notes");
        }
    }
    Ok(())
}

fn print_note(note: &Note) {
    println!(
        "{}",
        if note.title.is_empty() {
            "(untitled)"
        } else {
            note.title.as_str()
        }
    );
    println!("Written: {}", local_time(note.timestamp));
    if let Some(location) = note.location {
        println!("Location: {:.5}, {:.5}", location.lat, location.lng);
    }
    if !note.tags.is_empty() {
        println!("Tags: {}", note.tags.join(", "));
    }
    println!();
    println!("{}", note.content);
}

// === EMT incidents ===

fn handle_emt(book: &mut Logbook, cmd: EmtCommand) -> Result<()> {
    let now = Local::now();
    match cmd {
        EmtCommand::New { form, draft } => {
            let mut report = book.start_emt()?;
            form.apply(&mut report, now.time(), &book.config().incidents)?;
            if draft {
                print_kept(book.keep_emt_draft(&report)?, "emt");
            } else {
                let view = book.save_emt(report, None)?;
                println!("Saved EMT incident ({view})");
            }
        }
        EmtCommand::Edit { index, form } => {
            let index = match index {
                Some(index) => index,
                None => match book.continue_emt() {
                    Some(fieldlog::View::EmtEdit { index }) => index,
                    _ => bail!("no EMT incidents saved yet"),
                },
            };
            let mut report = book.emt_incident(index)?.report.clone();
            form.apply(&mut report, now.time(), &book.config().incidents)?;
            book.save_emt(report, Some(index))?;
            println!("Updated EMT incident {index}");
        }
        EmtCommand::List {
            filter,
            conditions,
            format,
        } => {
            let mut filter = filter.to_filter(book.config().incidents.default_sort);
            filter.tags.extend(conditions);
            let matches = book.emt_history(&filter, &now);
            match format {
                OutputFormat::Json => print_json(&indexed(&matches))?,
                OutputFormat::Plain => {
                    for m in &matches {
                        println!("{}", emt_summary(m.index, m.record));
                    }
                    println!(
                        "{} of {} incidents",
                        matches.len(),
                        book.emt_incidents().len()
                    );
                }
            }
        }
        EmtCommand::Show { index, format } => {
            let incident = book.emt_incident(index)?;
            match format {
                OutputFormat::Json => print_json(incident)?,
                OutputFormat::Plain => print_emt(index, incident),
            }
        }
    }
    Ok(())
}

fn emt_summary(index: usize, incident: &EmtIncident) -> String {
    let conditions = if incident.report.conditions.is_empty() {
        "-".to_string()
    } else {
        incident.report.conditions.join(", ")
    };
    format!(
        "[{index}] {}  {} events  {conditions}",
        local_time(incident.created_at),
        incident.report.timeline.len()
    )
}

fn print_emt(index: usize, incident: &EmtIncident) {
    println!("EMT incident {index} ({})", incident.id);
    println!("Saved: {}", local_time(incident.created_at));
    print_emt_report(&incident.report);
}

fn print_emt_report(report: &EmtReport) {
    print_list("Timeline", &report.timeline);
    print_list("Vitals", &report.vitals);
    print_list("Conditions", &report.conditions);
    if !report.notes.is_empty() {
        println!("Notes:\n  {}", report.notes);
    }
}

// === Fire incidents ===

fn handle_fire(book: &mut Logbook, cmd: FireCommand) -> Result<()> {
    let now = Local::now();
    let presets = book.config().incidents.clone();
    match cmd {
        FireCommand::New { form, draft } => {
            let mut report = book.start_fire()?;
            form.apply(&mut report, now.time(), &presets)?;
            if draft {
                print_kept(book.keep_fire_draft(&report)?, "fire");
            } else {
                if report.fire_type.is_empty() {
                    book.keep_fire_draft(&report)?;
                    bail!("a fire type is required (draft kept; pass --type)");
                }
                let view = book.save_fire(report)?;
                println!("Saved fire incident ({view})");
            }
        }
        FireCommand::Edit { index, form } => {
            let mut report = book.fire_incident(index)?.report.clone();
            form.apply(&mut report, now.time(), &presets)?;
            book.update_fire(index, report)?;
            println!("Updated fire incident {index}");
        }
        FireCommand::List {
            filter,
            tags,
            fire_type,
            severity,
            unit,
            format,
        } => {
            let filter = fire_filter(
                &filter,
                &tags,
                fire_type,
                severity,
                unit,
                book.config().incidents.default_sort,
            );
            let matches = book.fire_history(&filter, &now);
            match format {
                OutputFormat::Json => print_json(&indexed(&matches))?,
                OutputFormat::Plain => {
                    for m in &matches {
                        println!("{}", fire_summary(m.index, m.record));
                    }
                    println!(
                        "{} of {} incidents",
                        matches.len(),
                        book.fire_incidents().len()
                    );
                    let tags = collect_tags(book.fire_incidents());
                    if !tags.is_empty() {
                        println!("Tags in use: {}", tags.join(", "));
                    }
                    let units = collect_units(book.fire_incidents());
                    if !units.is_empty() {
                        println!("Units in use: {}", units.join(", "));
                    }
                }
            }
        }
        FireCommand::Show { index, format } => {
            let incident = book.fire_incident(index)?;
            match format {
                OutputFormat::Json => print_json(incident)?,
                OutputFormat::Plain => print_fire(index, incident),
            }
        }
        FireCommand::Delete { id } => {
            book.delete_fire(&id)?;
            println!("Deleted fire incident {id}");
        }
        FireCommand::Duplicate { index } => {
            book.duplicate_fire(index)?;
            println!("Incident {index} copied. Run `fieldlog fire new` to start from it.");
        }
    }
    Ok(())
}

fn fire_summary(index: usize, incident: &FireIncident) -> String {
    let r = &incident.report;
    let severity = r
        .severity
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    format!(
        "[{index}] {}  {}  {severity}  {}",
        local_time(incident.timestamp),
        if r.fire_type.is_empty() {
            "(no type)"
        } else {
            r.fire_type.as_str()
        },
        r.units.join(", ")
    )
}

fn print_fire(index: usize, incident: &FireIncident) {
    println!("Fire incident {index} ({})", incident.id);
    println!("Saved: {}", local_time(incident.timestamp));
    print_fire_report(&incident.report);
}

fn print_fire_report(report: &FireReport) {
    let fields = [
        ("Type", &report.fire_type),
        ("Arrival conditions", &report.arrival_conditions),
        ("Hazards", &report.hazards),
        ("Actions taken", &report.actions_taken),
        ("Notes", &report.notes),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("{label}: {value}");
        }
    }
    if let Some(severity) = report.severity {
        println!("Severity: {severity}");
    }
    print_list("Units", &report.units);
    print_list("Tags", &report.tags);
    let timeline: Vec<String> = report
        .timeline
        .iter()
        .map(|TimelineEvent { time, event }| format!("{time}  {event}"))
        .collect();
    print_list("Timeline", &timeline);
    if !report.photos.is_empty() {
        println!("Photos: {}", report.photos.len());
    }
}

// === Drafts ===

fn print_kept(written: bool, kind: &str) {
    if written {
        println!("Draft saved. Run `fieldlog {kind} new` to continue it.");
    } else {
        println!("Draft unchanged. Run `fieldlog {kind} new` to continue it.");
    }
}

fn handle_draft(book: &mut Logbook, cmd: &DraftCommand) -> Result<()> {
    match cmd {
        DraftCommand::Show { kind } => match kind {
            DraftKind::Emt => match book.emt_draft()? {
                Some(report) => print_emt_report(&report),
                None => println!("No EMT draft"),
            },
            DraftKind::Fire => match book.fire_draft()? {
                Some(report) => print_fire_report(&report),
                None => println!("No fire draft"),
            },
        },
        DraftCommand::Discard { kind } => {
            let removed = match kind {
                DraftKind::Emt => book.discard_emt_draft()?,
                DraftKind::Fire => book.discard_fire_draft()?,
            };
            if removed {
                println!("Draft discarded");
            } else {
                println!("No draft to discard");
            }
        }
    }
    Ok(())
}

// === Status / config / serve ===

fn handle_status(book: &Logbook, json: bool) -> Result<()> {
    let status = book.status()?;
    if json {
        return print_json(&status);
    }

    println!("fieldlog status");
    println!("---------------");
    println!("Database:        {}", status.database_path);
    println!("Notes:           {}", status.notes);
    println!("EMT incidents:   {}", status.emt_incidents);
    println!("Fire incidents:  {}", status.fire_incidents);
    println!("EMT draft:       {}", yes_no(status.emt_draft));
    println!("Fire draft:      {}", yes_no(status.fire_draft));
    println!("Stored bytes:    {}", status.storage.value_bytes);
    if let Some(last) = &status.storage.last_updated {
        println!("Last write:      {last}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Drafts]");
                println!("  Autosave:       {}", config.drafts.autosave);
                println!();
                println!("[Incidents]");
                println!("  Max photos:     {}", config.incidents.max_photos);
                println!("  Default sort:   {}", config.incidents.default_sort);
                println!("  Fire types:     {}", config.incidents.fire_types.join(", "));
                println!("  Units:          {}", config.incidents.units.join(", "));
                println!("  Conditions:     {}", config.incidents.conditions.join(", "));
                println!("  EMT events:     {}", config.incidents.emt_events.join(", "));
                println!();
                println!("[Server]");
                println!("  Address:        {}:{}", config.server.host, config.server.port);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn handle_serve(config: &Config, cmd: &ServeCommand) -> Result<()> {
    let mut addr = config.server_addr()?;
    if let Some(port) = cmd.port {
        addr.set_port(port);
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(fieldlog::server::serve(addr))?;
    Ok(())
}

// === Formatting helpers ===

fn records<'a, R>(matches: &[Match<'a, R>]) -> Vec<&'a R> {
    matches.iter().map(|m| m.record).collect()
}

#[derive(serde::Serialize)]
struct Indexed<'a, R> {
    index: usize,
    #[serde(flatten)]
    record: &'a R,
}

fn indexed<'a, R>(matches: &[Match<'a, R>]) -> Vec<Indexed<'a, R>> {
    matches
        .iter()
        .map(|m| Indexed {
            index: m.index,
            record: m.record,
        })
        .collect()
}

fn local_time(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn print_list(label: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    println!("{label}:");
    for value in values {
        println!("  - {value}");
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
