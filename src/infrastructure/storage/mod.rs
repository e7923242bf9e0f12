//! Storage implementations

mod inspections;
mod memory;
mod targets;

pub use inspections::InMemoryInspectionRepository;
pub use memory::InMemoryTicketRepository;
pub use targets::InMemoryMonthlyTargetRepository;
