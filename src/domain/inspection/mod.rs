//! Vehicle inspection aggregate
//!
//! Contains the inspection entity, its checklist, and repository interface.

pub mod model;
pub mod repository;

pub use model::{InspectionChecklist, VehicleInspection};
pub use repository::InspectionRepository;
