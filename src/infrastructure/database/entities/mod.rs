//! Database entities module

pub mod monthly_target;
pub mod parking_ticket;
pub mod vehicle_inspection;

pub use monthly_target::Entity as MonthlyTarget;
pub use parking_ticket::Entity as ParkingTicket;
pub use vehicle_inspection::Entity as VehicleInspection;
