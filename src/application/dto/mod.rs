pub mod command;
pub mod inspection;
pub mod ticket;

pub use command::{CompleteParking, StartParking};
pub use inspection::{CreateInspection, InspectionDto, UpdateInspection};
pub use ticket::TicketDto;
