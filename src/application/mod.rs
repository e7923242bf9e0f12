pub mod dto;
pub mod services;

// Re-export key types for convenience
pub use dto::{CompleteParking, CreateInspection, InspectionDto, StartParking, TicketDto, UpdateInspection};
pub use services::{
    InspectionService, MonthlyDashboard, ParkingService, TrafficReport, TrafficReportService,
};
