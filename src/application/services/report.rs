//! Traffic report over a period of parking sessions, and the monthly
//! dashboard built on it

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::store_call::bounded;
use crate::domain::target::{month_bounds, year_bounds};
use crate::domain::{
    DomainError, DomainResult, MonthlyTargetRepository, ParkingTicket, TicketRepository,
};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Part of the day an entry falls in, by the ticket's own local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodOfDay {
    /// 06:00 to 11:59
    Morning,
    /// 12:00 to 17:59
    Afternoon,
    Night,
}

impl PeriodOfDay {
    pub fn of(at: DateTime<FixedOffset>) -> Self {
        match at.hour() {
            6..=11 => PeriodOfDay::Morning,
            12..=17 => PeriodOfDay::Afternoon,
            _ => PeriodOfDay::Night,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodOfDayCounts {
    pub morning: u64,
    pub afternoon: u64,
    pub night: u64,
}

impl PeriodOfDayCounts {
    fn record(&mut self, period: PeriodOfDay) {
        match period {
            PeriodOfDay::Morning => self.morning += 1,
            PeriodOfDay::Afternoon => self.afternoon += 1,
            PeriodOfDay::Night => self.night += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub count: u64,
}

/// Entries of a Monday-to-Sunday week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekCount {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// "dd/mm - dd/mm"
    pub label: String,
    pub count: u64,
}

impl WeekCount {
    fn new(week_start: NaiveDate, count: u64) -> Self {
        let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(week_start);
        Self {
            week_start,
            week_end,
            label: format!("{} - {}", week_start.format("%d/%m"), week_end.format("%d/%m")),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrafficReport {
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
    pub total_entries: u64,
    pub active: u64,
    pub closed: u64,
    /// Sum of settled amounts; active tickets contribute nothing.
    pub revenue: Decimal,
    pub by_period_of_day: PeriodOfDayCounts,
    /// Always seven rows, Monday first.
    pub by_weekday: Vec<WeekdayCount>,
    /// Ascending by week start; weeks without entries are omitted.
    pub by_week: Vec<WeekCount>,
    /// Ascending by (year, month); months without entries are omitted.
    pub by_month: Vec<MonthCount>,
    /// Ascending; years without entries are omitted.
    pub by_year: Vec<YearCount>,
}

impl TrafficReport {
    /// Calendar buckets use the date in each ticket's own offset.
    pub fn from_tickets(
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
        tickets: &[ParkingTicket],
    ) -> Self {
        let mut active = 0;
        let mut closed = 0;
        let mut revenue = Decimal::ZERO;
        let mut by_period_of_day = PeriodOfDayCounts::default();
        let mut weekdays = [0u64; 7];
        let mut weeks: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();

        for ticket in tickets {
            let entry = ticket.entry_at();
            match ticket.total_amount() {
                Some(amount) => {
                    closed += 1;
                    revenue = revenue.saturating_add(amount);
                }
                None => active += 1,
            }
            by_period_of_day.record(PeriodOfDay::of(entry));
            weekdays[entry.weekday().num_days_from_monday() as usize] += 1;
            *weeks.entry(week_start(entry.date_naive())).or_default() += 1;
            *months.entry((entry.year(), entry.month())).or_default() += 1;
        }

        Self {
            from,
            to,
            total_entries: tickets.len() as u64,
            active,
            closed,
            revenue,
            by_period_of_day,
            by_weekday: WEEKDAYS
                .iter()
                .zip(weekdays)
                .map(|(day, count)| WeekdayCount {
                    weekday: day.to_string(),
                    count,
                })
                .collect(),
            by_week: weeks
                .into_iter()
                .map(|(start, count)| WeekCount::new(start, count))
                .collect(),
            by_month: months
                .into_iter()
                .map(|((year, month), count)| MonthCount { year, month, count })
                .collect(),
            by_year: count_by_year(tickets.iter().map(|t| t.entry_at().year())),
        }
    }
}

/// Monday on or before `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

fn count_by_year(years: impl Iterator<Item = i32>) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for year in years {
        *counts.entry(year).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Target set for a month next to the entries it actually had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTargetProgress {
    pub year: i32,
    pub month: u32,
    /// 0 when no target was set
    pub target_entries: i32,
    pub actual_entries: u64,
}

/// Figures for one calendar month. Month and year windows are UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyDashboard {
    pub year: i32,
    pub month: u32,
    /// Entries of the month, with weekly and period-of-day breakdowns
    pub report: TrafficReport,
    /// Twelve rows for the dashboard's year, January first
    pub entries_by_month: Vec<MonthCount>,
    /// Every stored ticket, grouped by UTC year
    pub entries_by_year: Vec<YearCount>,
    pub target: MonthlyTargetProgress,
}

/// Aggregates entries of a period for dashboards.
pub struct TrafficReportService {
    tickets: Arc<dyn TicketRepository>,
    targets: Arc<dyn MonthlyTargetRepository>,
    store_timeout: Option<StdDuration>,
}

impl TrafficReportService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        targets: Arc<dyn MonthlyTargetRepository>,
    ) -> Self {
        Self {
            tickets,
            targets,
            store_timeout: None,
        }
    }

    /// Bound every store call. An elapsed timeout surfaces as `StoreUnavailable`.
    pub fn with_store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    async fn period(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DomainResult<Vec<ParkingTicket>> {
        bounded(self.store_timeout, "get_by_period", self.tickets.get_by_period(from, to)).await
    }

    /// Report over tickets whose entry falls in `[from, to)`.
    pub async fn build(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DomainResult<TrafficReport> {
        if to < from {
            return Err(DomainError::InvalidInput(
                "The end date must be greater than or equal to the start date".to_string(),
            ));
        }

        let tickets = self.period(from, to).await?;
        debug!(count = tickets.len(), from = %from, to = %to, "Building traffic report");

        Ok(TrafficReport::from_tickets(from, to, &tickets))
    }

    pub async fn monthly_dashboard(&self, year: i32, month: u32) -> DomainResult<MonthlyDashboard> {
        let (month_start, month_end) = month_bounds(year, month)?;
        let (year_start, year_end) = year_bounds(year)?;

        let report = self.build(month_start, month_end).await?;

        let mut months = [0u64; 12];
        for ticket in self.period(year_start, year_end).await? {
            months[ticket.entry_at().with_timezone(&Utc).month0() as usize] += 1;
        }
        let entries_by_month = (1..=12u32)
            .zip(months)
            .map(|(month, count)| MonthCount { year, month, count })
            .collect();

        let all = bounded(self.store_timeout, "get_all", self.tickets.get_all()).await?;
        let entries_by_year =
            count_by_year(all.iter().map(|t| t.entry_at().with_timezone(&Utc).year()));

        let target_entries = bounded(self.store_timeout, "get_target", self.targets.get(year, month))
            .await?
            .map_or(0, |t| t.target_entries());

        debug!(year, month, entries = report.total_entries, "Built monthly dashboard");

        Ok(MonthlyDashboard {
            year,
            month,
            target: MonthlyTargetProgress {
                year,
                month,
                target_entries,
                actual_entries: report.total_entries,
            },
            report,
            entries_by_month,
            entries_by_year,
        })
    }

    /// Set the month's entry target and report it against the month's entries.
    pub async fn set_monthly_target(
        &self,
        year: i32,
        month: u32,
        target_entries: i32,
    ) -> DomainResult<MonthlyTargetProgress> {
        let (month_start, month_end) = month_bounds(year, month)?;

        let target = bounded(
            self.store_timeout,
            "upsert_target",
            self.targets.upsert(year, month, target_entries),
        )
        .await?;
        let actual_entries = self.period(month_start, month_end).await?.len() as u64;

        info!(year, month, target_entries, actual_entries, "Monthly target set");

        Ok(MonthlyTargetProgress {
            year,
            month,
            target_entries: target.target_entries(),
            actual_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::TicketFilter;
    use crate::infrastructure::storage::{InMemoryMonthlyTargetRepository, InMemoryTicketRepository};
    use async_trait::async_trait;
    use uuid::Uuid;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ticket(plate: &str, entry: &str) -> ParkingTicket {
        ParkingTicket::new(Uuid::new_v4(), plate, at(entry)).unwrap()
    }

    fn closed(plate: &str, entry: &str, exit: &str, amount: &str) -> ParkingTicket {
        let mut t = ticket(plate, entry);
        t.close(at(exit), amount.parse().unwrap()).unwrap();
        t
    }

    fn service(tickets: Arc<dyn TicketRepository>) -> TrafficReportService {
        TrafficReportService::new(tickets, Arc::new(InMemoryMonthlyTargetRepository::new()))
    }

    #[test]
    fn period_of_day_uses_local_hour() {
        assert_eq!(PeriodOfDay::of(at("2024-05-01T05:59:59Z")), PeriodOfDay::Night);
        assert_eq!(PeriodOfDay::of(at("2024-05-01T06:00:00Z")), PeriodOfDay::Morning);
        assert_eq!(PeriodOfDay::of(at("2024-05-01T12:00:00Z")), PeriodOfDay::Afternoon);
        assert_eq!(PeriodOfDay::of(at("2024-05-01T18:00:00Z")), PeriodOfDay::Night);
        // 09:00 UTC is 06:00 in Sao Paulo.
        assert_eq!(
            PeriodOfDay::of(at("2024-05-01T06:00:00-03:00")),
            PeriodOfDay::Morning
        );
    }

    #[test]
    fn aggregates_counts_and_revenue() {
        let tickets = vec![
            closed("A1", "2024-04-29T07:00:00Z", "2024-04-29T08:00:00Z", "25.00"),
            closed("A2", "2024-04-30T13:00:00Z", "2024-04-30T13:10:00Z", "5.00"),
            ticket("A3", "2024-05-05T22:30:00Z"),
        ];
        let report = TrafficReport::from_tickets(
            at("2024-04-01T00:00:00Z"),
            at("2024-06-01T00:00:00Z"),
            &tickets,
        );

        assert_eq!(report.total_entries, 3);
        assert_eq!(report.active, 1);
        assert_eq!(report.closed, 2);
        assert_eq!(report.revenue, "30.00".parse::<Decimal>().unwrap());
        assert_eq!(
            report.by_period_of_day,
            PeriodOfDayCounts {
                morning: 1,
                afternoon: 1,
                night: 1
            }
        );

        let weekdays: Vec<(&str, u64)> = report
            .by_weekday
            .iter()
            .map(|w| (w.weekday.as_str(), w.count))
            .collect();
        assert_eq!(
            weekdays,
            vec![
                ("Mon", 1),
                ("Tue", 1),
                ("Wed", 0),
                ("Thu", 0),
                ("Fri", 0),
                ("Sat", 0),
                ("Sun", 1)
            ]
        );

        assert_eq!(
            report.by_month,
            vec![
                MonthCount { year: 2024, month: 4, count: 2 },
                MonthCount { year: 2024, month: 5, count: 1 },
            ]
        );
        assert_eq!(report.by_year, vec![YearCount { year: 2024, count: 3 }]);
    }

    #[test]
    fn weeks_start_on_monday() {
        let tickets = vec![
            // Sunday closes the week of Monday 2024-04-29.
            ticket("A1", "2024-05-05T23:00:00Z"),
            ticket("A2", "2024-04-29T00:00:00Z"),
            // Next Monday opens a new week.
            ticket("A3", "2024-05-06T00:00:00Z"),
            // Monday in UTC, still Sunday in Sao Paulo.
            ticket("A4", "2024-05-05T22:30:00-03:00"),
            ticket("A5", "2024-06-12T10:00:00Z"),
        ];
        let report = TrafficReport::from_tickets(
            at("2024-04-01T00:00:00Z"),
            at("2024-07-01T00:00:00Z"),
            &tickets,
        );

        assert_eq!(
            report.by_week,
            vec![
                WeekCount {
                    week_start: date("2024-04-29"),
                    week_end: date("2024-05-05"),
                    label: "29/04 - 05/05".to_string(),
                    count: 3,
                },
                WeekCount {
                    week_start: date("2024-05-06"),
                    week_end: date("2024-05-12"),
                    label: "06/05 - 12/05".to_string(),
                    count: 1,
                },
                WeekCount {
                    week_start: date("2024-06-10"),
                    week_end: date("2024-06-16"),
                    label: "10/06 - 16/06".to_string(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn years_are_ascending() {
        let tickets = vec![
            ticket("A1", "2025-01-01T00:00:00Z"),
            ticket("A2", "2023-06-01T00:00:00Z"),
            ticket("A3", "2025-03-01T00:00:00Z"),
        ];
        let report = TrafficReport::from_tickets(
            at("2023-01-01T00:00:00Z"),
            at("2026-01-01T00:00:00Z"),
            &tickets,
        );
        assert_eq!(
            report.by_year,
            vec![
                YearCount { year: 2023, count: 1 },
                YearCount { year: 2025, count: 2 },
            ]
        );
    }

    #[test]
    fn empty_period() {
        let report =
            TrafficReport::from_tickets(at("2024-04-01T00:00:00Z"), at("2024-04-01T00:00:00Z"), &[]);
        assert_eq!(report.total_entries, 0);
        assert_eq!(report.revenue, Decimal::ZERO);
        assert_eq!(report.by_weekday.len(), 7);
        assert!(report.by_week.is_empty());
        assert!(report.by_month.is_empty());
        assert!(report.by_year.is_empty());
    }

    #[tokio::test]
    async fn build_reads_half_open_period() {
        let repo = Arc::new(InMemoryTicketRepository::new());
        repo.add(ticket("A1", "2024-04-30T23:59:59Z")).await.unwrap();
        repo.add(ticket("A2", "2024-05-01T00:00:00Z")).await.unwrap();
        repo.add(ticket("A3", "2024-06-01T00:00:00Z")).await.unwrap();

        let service = service(repo);
        let report = service
            .build(at("2024-05-01T00:00:00Z"), at("2024-06-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(report.total_entries, 1);

        let inverted = service
            .build(at("2024-06-01T00:00:00Z"), at("2024-05-01T00:00:00Z"))
            .await;
        assert!(matches!(inverted, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn dashboard_combines_month_year_and_target() {
        let repo = Arc::new(InMemoryTicketRepository::new());
        for (plate, entry) in [
            ("A1", "2023-12-31T23:59:59Z"),
            ("A2", "2024-01-15T08:00:00Z"),
            ("A3", "2024-05-01T00:00:00Z"),
            ("A4", "2024-05-20T18:30:00Z"),
            ("A5", "2024-05-31T23:59:59Z"),
            ("A6", "2024-06-01T00:00:00Z"),
            ("A7", "2025-02-01T00:00:00Z"),
        ] {
            repo.add(ticket(plate, entry)).await.unwrap();
        }
        let svc = service(repo);

        let before = svc.monthly_dashboard(2024, 5).await.unwrap();
        assert_eq!(before.report.total_entries, 3);
        assert_eq!(
            before.target,
            MonthlyTargetProgress {
                year: 2024,
                month: 5,
                target_entries: 0,
                actual_entries: 3
            }
        );

        let progress = svc.set_monthly_target(2024, 5, 10).await.unwrap();
        assert_eq!(progress.target_entries, 10);
        assert_eq!(progress.actual_entries, 3);

        let dashboard = svc.monthly_dashboard(2024, 5).await.unwrap();
        assert_eq!(dashboard.target, progress);

        let months: Vec<u64> = dashboard.entries_by_month.iter().map(|m| m.count).collect();
        assert_eq!(months, vec![1, 0, 0, 0, 3, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            dashboard.entries_by_year,
            vec![
                YearCount { year: 2023, count: 1 },
                YearCount { year: 2024, count: 5 },
                YearCount { year: 2025, count: 1 },
            ]
        );
        let weeks: Vec<(&str, u64)> = dashboard
            .report
            .by_week
            .iter()
            .map(|w| (w.label.as_str(), w.count))
            .collect();
        assert_eq!(weeks, vec![("29/04 - 05/05", 1), ("20/05 - 26/05", 1), ("27/05 - 02/06", 1)]);
    }

    #[tokio::test]
    async fn dashboard_and_target_validate_year_and_month() {
        let svc = service(Arc::new(InMemoryTicketRepository::new()));
        assert!(matches!(
            svc.monthly_dashboard(2024, 13).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.monthly_dashboard(0, 1).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.set_monthly_target(2024, 0, 5).await,
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.set_monthly_target(2024, 5, -5).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    /// Never answers a period query.
    struct StalledRepository;

    #[async_trait]
    impl TicketRepository for StalledRepository {
        async fn add(&self, _ticket: ParkingTicket) -> DomainResult<()> {
            Ok(())
        }
        async fn get_by_id(&self, _id: Uuid) -> DomainResult<Option<ParkingTicket>> {
            Ok(None)
        }
        async fn get_active_by_plate(&self, _plate: &str) -> DomainResult<Option<ParkingTicket>> {
            Ok(None)
        }
        async fn get_all(&self) -> DomainResult<Vec<ParkingTicket>> {
            Ok(Vec::new())
        }
        async fn get_by_period(
            &self,
            _from: DateTime<FixedOffset>,
            _to: DateTime<FixedOffset>,
        ) -> DomainResult<Vec<ParkingTicket>> {
            tokio::time::sleep(StdDuration::from_secs(5)).await;
            Ok(Vec::new())
        }
        async fn filter(&self, _filter: &TicketFilter) -> DomainResult<Vec<ParkingTicket>> {
            Ok(Vec::new())
        }
        async fn update(&self, ticket: ParkingTicket) -> DomainResult<ParkingTicket> {
            Ok(ticket)
        }
    }

    #[tokio::test]
    async fn slow_period_query_times_out_as_unavailable() {
        let svc = service(Arc::new(StalledRepository)).with_store_timeout(StdDuration::from_millis(20));

        let report = svc
            .build(at("2024-05-01T00:00:00Z"), at("2024-06-01T00:00:00Z"))
            .await;
        assert!(matches!(report, Err(DomainError::StoreUnavailable(_))));

        let dashboard = svc.monthly_dashboard(2024, 5).await;
        assert!(matches!(dashboard, Err(DomainError::StoreUnavailable(_))));
    }
}
