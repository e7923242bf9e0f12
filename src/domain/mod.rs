pub mod filter;
pub mod inspection;
pub mod tariff;
pub mod target;
pub mod ticket;

// Re-export commonly used types
pub use filter::{RangeFilter, TicketFilter};
pub use inspection::{InspectionChecklist, InspectionRepository, VehicleInspection};
pub use tariff::{FeeCalculator, RateTable, RateTier};
pub use target::{MonthlyTarget, MonthlyTargetRepository};
pub use ticket::{ParkingTicket, TicketRepository, TicketStatus};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
