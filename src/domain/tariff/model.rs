//! Rate table for parking fees

use chrono::Duration;
use rust_decimal::Decimal;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// One step of the fee schedule.
///
/// `amount` is what gets added to the running total once the elapsed time
/// reaches into this tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTier {
    threshold: Duration,
    amount: Decimal,
}

impl RateTier {
    pub fn new(threshold: Duration, amount: Decimal) -> DomainResult<Self> {
        if threshold <= Duration::zero() {
            return Err(DomainError::InvalidInput(
                "Rate threshold must be positive".to_string(),
            ));
        }

        if amount < Decimal::ZERO {
            return Err(DomainError::InvalidInput(
                "Rate amount must be non-negative".to_string(),
            ));
        }

        Ok(Self { threshold, amount })
    }

    /// Shorthand for tiers expressed in whole minutes.
    pub fn minutes(minutes: i64, amount: Decimal) -> DomainResult<Self> {
        let threshold = Duration::try_minutes(minutes).ok_or_else(|| {
            DomainError::InvalidInput(format!("Rate threshold of {} minutes is out of range", minutes))
        })?;
        Self::new(threshold, amount)
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Validated, ascending list of [`RateTier`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    tiers: Vec<RateTier>,
}

impl RateTable {
    pub fn new(tiers: impl IntoIterator<Item = RateTier>) -> DomainResult<Self> {
        let mut tiers: Vec<RateTier> = tiers.into_iter().collect();
        if tiers.is_empty() {
            return Err(DomainError::InvalidInput(
                "At least one rate must be provided".to_string(),
            ));
        }

        tiers.sort_by_key(|tier| tier.threshold);

        if tiers
            .windows(2)
            .any(|pair| pair[0].threshold == pair[1].threshold)
        {
            return Err(DomainError::InvalidInput(
                "Rate thresholds must be unique".to_string(),
            ));
        }

        // A free overflow tier would make every stay past the last threshold cost the same.
        let overflow = &tiers[tiers.len() - 1];
        if overflow.amount.is_zero() {
            return Err(DomainError::InvalidInput(
                "Overflow rate amount must be greater than zero".to_string(),
            ));
        }

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// The last tier, repeated in blocks past its threshold.
    pub fn overflow_tier(&self) -> &RateTier {
        // Construction rejects empty tables.
        &self.tiers[self.tiers.len() - 1]
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let tier = |minutes: i64, cents: i64| RateTier {
            threshold: Duration::minutes(minutes),
            amount: Decimal::new(cents, 2),
        };

        Self {
            tiers: vec![
                tier(15, 500),
                tier(30, 800),
                tier(60, 1200),
                tier(120, 2000),
                tier(240, 3200),
                tier(480, 5000),
            ],
        }
    }
}
