//! Parking Service CLI
//!
//! Drives the parking session lifecycle against the configured SQLite store
//! and prints results as JSON on stdout. Logs go to stderr.
//!
//! ```sh
//! # Default config (~/.config/parking-service/config.toml)
//! parking-service start ABC123
//! parking-service complete 6f1c...-...
//! parking-service filter '{"total_amount_greater_than": "20"}'
//! parking-service report --from 2024-05-01T00:00:00Z --to 2024-06-01T00:00:00Z
//! parking-service target 2024 5 1200
//! parking-service dashboard 2024 5
//!
//! # Validate config without touching the database
//! parking-service --config /etc/parking-service/config.toml check
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use parking_core::application::dto::{
    CompleteParking, CreateInspection, InspectionDto, StartParking, TicketDto, UpdateInspection,
};
use parking_core::config::AppConfig;
use parking_core::domain::{
    FeeCalculator, InspectionChecklist, InspectionRepository, MonthlyTargetRepository,
    ParkingTicket, TicketFilter, TicketRepository,
};
use parking_core::infrastructure::database::migrator::Migrator;
use parking_core::{
    default_config_path, init_database, InspectionService, ParkingService,
    SeaOrmInspectionRepository, SeaOrmMonthlyTargetRepository, SeaOrmTicketRepository,
    TrafficReportService,
};

/// Parking lot sessions, fees and reports.
#[derive(Parser, Debug)]
#[command(
    name = "parking-service",
    version,
    about = "Parking session lifecycle and tiered fee calculation",
    long_about = "Opens and closes parking sessions, computes tiered fees and \
                  queries tickets.\n\n\
                  Default config: ~/.config/parking-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKING_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Skip database migrations on startup.
    #[arg(long, global = true)]
    no_migrate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a session for a plate.
    Start {
        plate: String,
        /// Entry time (RFC 3339); defaults to now.
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Close a session and settle its fee.
    Complete {
        id: Uuid,
        /// Exit time (RFC 3339); defaults to now.
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Show a ticket by id.
    Show { id: Uuid },
    /// Show the active ticket of a plate.
    Active { plate: String },
    /// List every ticket, newest first.
    List,
    /// Query tickets with a JSON filter, e.g. '{"plate_in": ["ABC123"]}'.
    Filter {
        #[arg(default_value = "{}")]
        filter: String,
    },
    /// Tickets that entered in [from, to).
    Period {
        #[arg(long, value_parser = parse_time)]
        from: DateTime<FixedOffset>,
        #[arg(long, value_parser = parse_time)]
        to: DateTime<FixedOffset>,
    },
    /// Amount owed by a ticket so far.
    Quote {
        id: Uuid,
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Fee for a stay of the given length, without touching the store.
    Fee {
        #[arg(long, default_value_t = 0)]
        minutes: i64,
        #[arg(long, default_value_t = 0)]
        seconds: i64,
    },
    /// Traffic report over entries in [from, to).
    Report {
        #[arg(long, value_parser = parse_time)]
        from: DateTime<FixedOffset>,
        #[arg(long, value_parser = parse_time)]
        to: DateTime<FixedOffset>,
    },
    /// Monthly dashboard: weekly, monthly and yearly entries plus the target.
    Dashboard { year: i32, month: u32 },
    /// Set the entry target of a month.
    Target {
        year: i32,
        month: u32,
        entries: i32,
    },
    /// Record the vehicle checklist of a ticket, e.g.
    /// '{"no_scratches": false, "scratches_photo_url": "https://...", "no_missing_items": true,
    /// "no_lost_keys": true, "no_harsh_impacts": true}'.
    Inspect {
        ticket_id: Uuid,
        checklist: String,
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Replace the checklist of an inspection.
    Reinspect {
        inspection_id: Uuid,
        checklist: String,
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Show the inspection recorded for a ticket.
    Inspection { ticket_id: Uuid },
    /// Validate the configuration and exit.
    Check,
}

/// Services the store-backed subcommands run against.
struct App {
    parking: ParkingService,
    reports: TrafficReportService,
    inspections: InspectionService,
}

fn parse_time(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

/// Initialize tracing (logging) from the application config.
fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn tickets_json(tickets: &[ParkingTicket]) -> Vec<TicketDto> {
    tickets.iter().map(TicketDto::from_domain).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    if let Some(e) = load_error {
        error!("Failed to load config from {}: {}", config_path.display(), e);
        return Err(e.into());
    }
    info!("Configuration loaded from {}", config_path.display());

    let calculator = FeeCalculator::new(config.rate_table()?);

    match cli.command {
        Command::Check => {
            print_json(&json!({
                "config_file": config_path.display().to_string(),
                "database": config.database.url,
                "log_level": config.logging.level,
                "log_format": config.logging.format,
                "store_timeout_ms": config.store.timeout_ms,
                "rates": calculator.rates().tiers().iter().map(|t| json!({
                    "threshold_minutes": t.threshold().num_minutes(),
                    "amount": t.amount(),
                })).collect::<Vec<_>>(),
            }))?;
            return Ok(());
        }
        Command::Fee { minutes, seconds } => {
            let duration = Duration::try_minutes(minutes)
                .and_then(|m| Duration::try_seconds(seconds).and_then(|s| m.checked_add(&s)))
                .ok_or("duration out of range")?;
            print_json(&json!({
                "minutes": minutes,
                "seconds": seconds,
                "amount": calculator.calculate_fee(duration),
            }))?;
            return Ok(());
        }
        _ => {}
    }

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&config.database_config()).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    if !cli.no_migrate {
        info!("Running database migrations...");
        if let Err(e) = Migrator::up(&db, None).await {
            error!("Failed to run migrations: {}", e);
            return Err(e.into());
        }
        info!("Migrations completed");
    }

    let tickets: Arc<dyn TicketRepository> = Arc::new(SeaOrmTicketRepository::new(db.clone()));
    let targets: Arc<dyn MonthlyTargetRepository> =
        Arc::new(SeaOrmMonthlyTargetRepository::new(db.clone()));
    let inspections: Arc<dyn InspectionRepository> = Arc::new(SeaOrmInspectionRepository::new(db));

    let mut parking = ParkingService::new(tickets.clone(), calculator);
    let mut reports = TrafficReportService::new(tickets.clone(), targets);
    let mut inspection_service = InspectionService::new(inspections, tickets);
    if let Some(timeout) = config.store_timeout() {
        parking = parking.with_store_timeout(timeout);
        reports = reports.with_store_timeout(timeout);
        inspection_service = inspection_service.with_store_timeout(timeout);
    }
    let app = App {
        parking,
        reports,
        inspections: inspection_service,
    };

    let result = run(cli.command, &app).await;
    if let Err(ref e) = result {
        error!("{}", e);
    }
    result
}

async fn run(command: Command, app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let service = &app.parking;
    match command {
        Command::Start { plate, at } => {
            let ticket = service
                .start(StartParking { plate, entry_at: at })
                .await?;
            print_json(&TicketDto::from_domain(&ticket))
        }
        Command::Complete { id, at } => {
            let ticket = service
                .complete(CompleteParking { ticket_id: id, exit_at: at })
                .await?;
            print_json(&TicketDto::from_domain(&ticket))
        }
        Command::Show { id } => match service.get_by_id(id).await? {
            Some(ticket) => print_json(&TicketDto::from_domain(&ticket)),
            None => print_json(&serde_json::Value::Null),
        },
        Command::Active { plate } => match service.get_active_by_plate(&plate).await? {
            Some(ticket) => print_json(&TicketDto::from_domain(&ticket)),
            None => print_json(&serde_json::Value::Null),
        },
        Command::List => print_json(&tickets_json(&service.list_all().await?)),
        Command::Filter { filter } => {
            let filter: TicketFilter = serde_json::from_str(&filter)?;
            print_json(&tickets_json(&service.filter(filter).await?))
        }
        Command::Period { from, to } => {
            print_json(&tickets_json(&service.list_by_period(from, to).await?))
        }
        Command::Quote { id, at } => {
            let amount = service.quote(id, at).await?;
            print_json(&json!({ "ticket_id": id, "amount": amount }))
        }
        Command::Report { from, to } => print_json(&app.reports.build(from, to).await?),
        Command::Dashboard { year, month } => {
            print_json(&app.reports.monthly_dashboard(year, month).await?)
        }
        Command::Target {
            year,
            month,
            entries,
        } => print_json(&app.reports.set_monthly_target(year, month, entries).await?),
        Command::Inspect {
            ticket_id,
            checklist,
            at,
        } => {
            let checklist: InspectionChecklist = serde_json::from_str(&checklist)?;
            let inspection = app
                .inspections
                .create(CreateInspection {
                    ticket_id,
                    checklist,
                    inspected_at: at,
                })
                .await?;
            print_json(&InspectionDto::from_domain(&inspection))
        }
        Command::Reinspect {
            inspection_id,
            checklist,
            at,
        } => {
            let checklist: InspectionChecklist = serde_json::from_str(&checklist)?;
            let inspection = app
                .inspections
                .update(UpdateInspection {
                    inspection_id,
                    checklist,
                    inspected_at: at,
                })
                .await?;
            print_json(&InspectionDto::from_domain(&inspection))
        }
        Command::Inspection { ticket_id } => {
            match app.inspections.get_by_ticket_id(ticket_id).await? {
                Some(inspection) => print_json(&InspectionDto::from_domain(&inspection)),
                None => print_json(&serde_json::Value::Null),
            }
        }
        // Handled before the store is opened.
        Command::Fee { .. } | Command::Check => Ok(()),
    }
}
