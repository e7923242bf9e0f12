//! # Parking Service
//!
//! Parking session lifecycle, tiered fee calculation and ticket queries.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Tickets, rate tables, the fee calculator, the filter engine,
//!   monthly targets and vehicle inspections
//! - **application**: Use cases (`ParkingService`, `TrafficReportService`,
//!   `InspectionService`) and DTOs
//! - **infrastructure**: Stores (in-memory and SeaORM/SQLite)
//! - **shared**: Error types

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryInspectionRepository, InMemoryMonthlyTargetRepository,
    InMemoryTicketRepository, SeaOrmInspectionRepository, SeaOrmMonthlyTargetRepository,
    SeaOrmTicketRepository,
};

pub use application::{InspectionService, ParkingService, TrafficReportService};
