//! Declarative ticket filter
//!
//! A [`TicketFilter`] is a conjunction of optional predicates. Absent fields
//! impose no constraint. Stores may translate part of it into a query, but the
//! result must match [`TicketFilter::apply`] over the full ticket set.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ticket::{normalize_plate, normalize_plate_set, ParkingTicket};
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Inclusive time range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct RangeFilter {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
struct RawRange {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

impl TryFrom<RawRange> for RangeFilter {
    type Error = DomainError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        RangeFilter::new(raw.from, raw.to)
    }
}

impl RangeFilter {
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> DomainResult<Self> {
        if from > to {
            return Err(DomainError::InvalidInput(
                "The range start must be less than or equal to the end".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<FixedOffset> {
        self.from
    }

    pub fn to(&self) -> DateTime<FixedOffset> {
        self.to
    }

    pub fn contains(&self, at: DateTime<FixedOffset>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// Ad-hoc ticket query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketFilter {
    pub plate_equals: Option<String>,
    pub plate_not_equals: Option<String>,
    pub plate_in: Option<Vec<String>>,
    pub plate_not_in: Option<Vec<String>>,
    pub total_amount_equals: Option<Decimal>,
    pub total_amount_not_equals: Option<Decimal>,
    pub total_amount_greater_than: Option<Decimal>,
    pub total_amount_greater_than_or_equal: Option<Decimal>,
    pub total_amount_less_than: Option<Decimal>,
    pub total_amount_less_than_or_equal: Option<Decimal>,
    pub entry_at_between: Option<RangeFilter>,
    pub exit_at_not_between: Option<RangeFilter>,
}

impl TicketFilter {
    /// Normalize plate inputs so raw user input can be passed in.
    ///
    /// Blank scalars and empty-after-normalization sets become `None`.
    pub fn normalized(self) -> Self {
        Self {
            plate_equals: self.plate_equals.as_deref().and_then(normalize_plate),
            plate_not_equals: self.plate_not_equals.as_deref().and_then(normalize_plate),
            plate_in: self.plate_in.and_then(normalize_plate_set),
            plate_not_in: self.plate_not_in.and_then(normalize_plate_set),
            ..self
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let targets = [
            ("total_amount_equals", self.total_amount_equals),
            ("total_amount_not_equals", self.total_amount_not_equals),
            ("total_amount_greater_than", self.total_amount_greater_than),
            (
                "total_amount_greater_than_or_equal",
                self.total_amount_greater_than_or_equal,
            ),
            ("total_amount_less_than", self.total_amount_less_than),
            (
                "total_amount_less_than_or_equal",
                self.total_amount_less_than_or_equal,
            ),
        ];

        for (name, value) in targets {
            if matches!(value, Some(v) if v < Decimal::ZERO) {
                return Err(DomainError::InvalidInput(format!(
                    "{} must be non-negative",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Whether any amount predicate is set. Such filters only match closed tickets.
    pub fn has_amount_predicate(&self) -> bool {
        self.total_amount_equals.is_some()
            || self.total_amount_not_equals.is_some()
            || self.total_amount_greater_than.is_some()
            || self.total_amount_greater_than_or_equal.is_some()
            || self.total_amount_less_than.is_some()
            || self.total_amount_less_than_or_equal.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, ticket: &ParkingTicket) -> bool {
        let plate = ticket.plate();

        if matches!(&self.plate_equals, Some(p) if p != plate) {
            return false;
        }
        if matches!(&self.plate_not_equals, Some(p) if p == plate) {
            return false;
        }
        if matches!(&self.plate_in, Some(set) if !set.iter().any(|p| p == plate)) {
            return false;
        }
        if matches!(&self.plate_not_in, Some(set) if set.iter().any(|p| p == plate)) {
            return false;
        }

        if self.has_amount_predicate() {
            // Active tickets have no amount yet and never satisfy an amount predicate.
            match ticket.total_amount() {
                Some(amount) if self.amount_matches(amount) => {}
                _ => return false,
            }
        }

        if let Some(range) = &self.entry_at_between {
            if !range.contains(ticket.entry_at()) {
                return false;
            }
        }

        if let Some(range) = &self.exit_at_not_between {
            match ticket.exit_at() {
                Some(exit) if !range.contains(exit) => {}
                _ => return false,
            }
        }

        true
    }

    fn amount_matches(&self, amount: Decimal) -> bool {
        let cmp = |target: Option<Decimal>, accept: fn(Ordering) -> bool| {
            target.map_or(true, |t| accept(amount.cmp(&t)))
        };

        cmp(self.total_amount_equals, Ordering::is_eq)
            && cmp(self.total_amount_not_equals, Ordering::is_ne)
            && cmp(self.total_amount_greater_than, Ordering::is_gt)
            && cmp(self.total_amount_greater_than_or_equal, Ordering::is_ge)
            && cmp(self.total_amount_less_than, Ordering::is_lt)
            && cmp(self.total_amount_less_than_or_equal, Ordering::is_le)
    }

    /// Evaluate in memory: keep matches, most recent entry first.
    pub fn apply<I>(&self, tickets: I) -> Vec<ParkingTicket>
    where
        I: IntoIterator<Item = ParkingTicket>,
    {
        let mut matched: Vec<ParkingTicket> =
            tickets.into_iter().filter(|t| self.matches(t)).collect();
        sort_newest_first(&mut matched);
        matched
    }
}

/// Default listing order: descending `entry_at`, ties by id.
pub fn sort_newest_first(tickets: &mut [ParkingTicket]) {
    tickets.sort_by(|a, b| {
        b.entry_at()
            .cmp(&a.entry_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}
