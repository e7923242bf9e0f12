//! Infrastructure layer - external concerns

pub mod database;
pub mod storage;

pub use database::{
    init_database, DatabaseConfig, SeaOrmInspectionRepository, SeaOrmMonthlyTargetRepository,
    SeaOrmTicketRepository,
};
pub use storage::{
    InMemoryInspectionRepository, InMemoryMonthlyTargetRepository, InMemoryTicketRepository,
};
