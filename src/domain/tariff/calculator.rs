//! Tiered parking fee calculation

use chrono::{DateTime, Duration, FixedOffset};
use rust_decimal::{Decimal, RoundingStrategy};

use super::model::RateTable;

/// Maps an elapsed duration to the amount owed, using a [`RateTable`].
///
/// Tiers are cumulative: a stay that reaches tier *n* pays the sum of the
/// amounts of tiers `0..=n`. Past the last threshold the last tier is billed
/// again for every started block of its own length.
#[derive(Debug, Clone, Default)]
pub struct FeeCalculator {
    rates: RateTable,
}

impl FeeCalculator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Amount owed for `duration`. Totals beyond the `Decimal` range
    /// saturate at `Decimal::MAX`.
    pub fn calculate_fee(&self, duration: Duration) -> Decimal {
        if duration <= Duration::zero() {
            return Decimal::ZERO;
        }

        let mut total = Decimal::ZERO;
        for tier in self.rates.tiers() {
            total = match total.checked_add(tier.amount()) {
                Some(sum) => sum,
                None => return Decimal::MAX,
            };
            if duration <= tier.threshold() {
                return round_money(total);
            }
        }

        let overflow = self.rates.overflow_tier();
        let extra = total_nanos(duration) - total_nanos(overflow.threshold());
        if extra > 0 {
            let block = total_nanos(overflow.threshold());
            let blocks = (extra + block - 1) / block;
            let billed = Decimal::try_from_i128_with_scale(blocks, 0)
                .ok()
                .and_then(|blocks| blocks.checked_mul(overflow.amount()))
                .and_then(|extra_fee| total.checked_add(extra_fee));
            total = match billed {
                Some(sum) => sum,
                None => return Decimal::MAX,
            };
        }

        round_money(total)
    }

    /// Fee accrued by a stay that began at `entry_at`, evaluated at `at`.
    pub fn quote(&self, entry_at: DateTime<FixedOffset>, at: DateTime<FixedOffset>) -> Decimal {
        self.calculate_fee(at - entry_at)
    }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn total_nanos(duration: Duration) -> i128 {
    i128::from(duration.num_seconds()) * 1_000_000_000 + i128::from(duration.subsec_nanos())
}
