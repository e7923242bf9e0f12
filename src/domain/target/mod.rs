//! Monthly entry target
//!
//! Contains the target entity and repository interface.

pub mod model;
pub mod repository;

pub use model::{month_bounds, validate_month, validate_year, year_bounds, MonthlyTarget};
pub use repository::MonthlyTargetRepository;
