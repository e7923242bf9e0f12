//! Ticket filter engine

pub mod model;

pub use model::{sort_newest_first, RangeFilter, TicketFilter};
