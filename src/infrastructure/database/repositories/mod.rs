//! Database repository implementations

pub mod inspection_repository;
pub mod target_repository;
pub mod ticket_repository;

pub use inspection_repository::SeaOrmInspectionRepository;
pub use target_repository::SeaOrmMonthlyTargetRepository;
pub use ticket_repository::SeaOrmTicketRepository;
