//! Application services

mod inspection;
mod parking;
mod report;
mod store_call;

pub use inspection::InspectionService;
pub use parking::ParkingService;
pub use report::{
    MonthCount, MonthlyDashboard, MonthlyTargetProgress, PeriodOfDay, PeriodOfDayCounts,
    TrafficReport, TrafficReportService, WeekCount, WeekdayCount, YearCount,
};
