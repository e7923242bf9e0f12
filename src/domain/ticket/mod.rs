//! Parking ticket aggregate
//!
//! Contains the ticket entity, plate normalization, and repository interface.

pub mod model;
pub mod plate;
pub mod repository;

pub use model::{ParkingTicket, TicketStatus};
pub use plate::{normalize_plate, normalize_plate_set, validate_plate, MAX_PLATE_LEN};
pub use repository::TicketRepository;
