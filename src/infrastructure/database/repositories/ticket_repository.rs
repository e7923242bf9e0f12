//! SeaORM implementation of TicketRepository

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset};
use log::debug;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Select, Set, SqlErr,
};
use uuid::Uuid;

use crate::domain::filter::TicketFilter;
use crate::domain::{DomainError, DomainResult, ParkingTicket, TicketRepository};
use crate::infrastructure::database::entities::parking_ticket;

pub struct SeaOrmTicketRepository {
    db: DatabaseConnection,
}

impl SeaOrmTicketRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn newest_first(select: Select<parking_ticket::Entity>) -> Select<parking_ticket::Entity> {
        select
            .order_by_desc(parking_ticket::Column::EntryAtNanos)
            .order_by_asc(parking_ticket::Column::Id)
    }

    async fn fetch(&self, select: Select<parking_ticket::Entity>) -> DomainResult<Vec<ParkingTicket>> {
        let models = Self::newest_first(select)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: parking_ticket::Model) -> DomainResult<ParkingTicket> {
    let total_amount = m
        .total_amount
        .as_deref()
        .map(Decimal::from_str)
        .transpose()
        .map_err(|e| {
            DomainError::StoreUnavailable(format!("Ticket {} has a malformed amount: {}", m.id, e))
        })?;

    ParkingTicket::restore(m.id, m.plate, m.entry_at, m.exit_at, total_amount, m.version)
}

fn entry_nanos(at: DateTime<FixedOffset>) -> DomainResult<i64> {
    at.timestamp_nanos_opt().ok_or_else(|| {
        DomainError::InvalidInput(format!("Entry time {} is out of the storable range", at))
    })
}

/// Nanosecond bound for range queries; instants past the i64 range clamp to it.
fn nanos_bound(at: DateTime<FixedOffset>) -> i64 {
    at.timestamp_nanos_opt()
        .unwrap_or(if at.year() < 1970 { i64::MIN } else { i64::MAX })
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::StoreUnavailable(format!("Database error: {}", e))
}

fn insert_err(e: DbErr, ticket: &ParkingTicket) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(format!(
            "There is already an active ticket for plate {}",
            ticket.plate()
        )),
        _ => db_err(e),
    }
}

fn sql_condition(filter: &TicketFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(plate) = &filter.plate_equals {
        cond = cond.add(parking_ticket::Column::Plate.eq(plate.as_str()));
    }
    if let Some(plate) = &filter.plate_not_equals {
        cond = cond.add(parking_ticket::Column::Plate.ne(plate.as_str()));
    }
    if let Some(plates) = &filter.plate_in {
        cond = cond.add(parking_ticket::Column::Plate.is_in(plates.iter().map(String::as_str)));
    }
    if let Some(plates) = &filter.plate_not_in {
        cond = cond.add(parking_ticket::Column::Plate.is_not_in(plates.iter().map(String::as_str)));
    }
    if let Some(range) = &filter.entry_at_between {
        cond = cond.add(
            parking_ticket::Column::EntryAtNanos
                .between(nanos_bound(range.from()), nanos_bound(range.to())),
        );
    }
    if filter.has_amount_predicate() {
        // Active tickets never satisfy an amount predicate.
        cond = cond.add(parking_ticket::Column::TotalAmount.is_not_null());
    }
    cond
}

// ── TicketRepository impl ───────────────────────────────────────

#[async_trait]
impl TicketRepository for SeaOrmTicketRepository {
    async fn add(&self, ticket: ParkingTicket) -> DomainResult<()> {
        debug!("Saving ticket {} for plate {}", ticket.id(), ticket.plate());

        let model = parking_ticket::ActiveModel {
            id: Set(ticket.id()),
            plate: Set(ticket.plate().to_string()),
            entry_at: Set(ticket.entry_at()),
            entry_at_nanos: Set(entry_nanos(ticket.entry_at())?),
            exit_at: Set(ticket.exit_at()),
            total_amount: Set(ticket.total_amount().map(|a| a.to_string())),
            version: Set(ticket.version()),
        };
        parking_ticket::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| insert_err(e, &ticket))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<ParkingTicket>> {
        parking_ticket::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn get_active_by_plate(&self, plate: &str) -> DomainResult<Option<ParkingTicket>> {
        parking_ticket::Entity::find()
            .filter(parking_ticket::Column::Plate.eq(plate))
            .filter(parking_ticket::Column::ExitAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn get_all(&self) -> DomainResult<Vec<ParkingTicket>> {
        self.fetch(parking_ticket::Entity::find()).await
    }

    async fn get_by_period(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> DomainResult<Vec<ParkingTicket>> {
        if to < from {
            return Err(DomainError::InvalidInput(
                "The end date must be greater than or equal to the start date".to_string(),
            ));
        }

        debug!("Loading tickets entered in [{}, {})", from, to);
        self.fetch(
            parking_ticket::Entity::find()
                .filter(parking_ticket::Column::EntryAtNanos.gte(nanos_bound(from)))
                .filter(parking_ticket::Column::EntryAtNanos.lt(nanos_bound(to))),
        )
        .await
    }

    async fn filter(&self, filter: &TicketFilter) -> DomainResult<Vec<ParkingTicket>> {
        // Plate and entry predicates narrow the query in SQL; amounts are
        // stored as text, so every predicate is re-checked exactly in memory.
        let candidates = self
            .fetch(parking_ticket::Entity::find().filter(sql_condition(filter)))
            .await?;
        Ok(filter.apply(candidates))
    }

    async fn update(&self, ticket: ParkingTicket) -> DomainResult<ParkingTicket> {
        debug!("Updating ticket {} at version {}", ticket.id(), ticket.version());

        let mut next = ticket;
        next.bump_version();

        let result = parking_ticket::Entity::update_many()
            .col_expr(parking_ticket::Column::ExitAt, Expr::value(next.exit_at()))
            .col_expr(
                parking_ticket::Column::TotalAmount,
                Expr::value(next.total_amount().map(|a| a.to_string())),
            )
            .col_expr(parking_ticket::Column::Version, Expr::value(next.version()))
            .filter(parking_ticket::Column::Id.eq(next.id()))
            .filter(parking_ticket::Column::Version.eq(next.version() - 1))
            .exec(&self.db)
            .await
            .map_err(|e| insert_err(e, &next))?;

        if result.rows_affected == 0 {
            let current = parking_ticket::Entity::find_by_id(next.id())
                .one(&self.db)
                .await
                .map_err(db_err)?;
            return Err(match current {
                None => DomainError::ticket_not_found(next.id()),
                Some(current) => DomainError::Conflict(format!(
                    "Ticket {} was modified concurrently (expected version {}, found {})",
                    next.id(),
                    next.version() - 1,
                    current.version
                )),
            });
        }

        Ok(next)
    }
}
