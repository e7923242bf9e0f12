//! Monthly target repository interface

use async_trait::async_trait;

use super::model::MonthlyTarget;
use crate::domain::DomainResult;

#[async_trait]
pub trait MonthlyTargetRepository: Send + Sync {
    /// Target for a month, if one was set
    async fn get(&self, year: i32, month: u32) -> DomainResult<Option<MonthlyTarget>>;

    /// Create the month's target or replace its entry count.
    /// The id of an existing target is kept.
    async fn upsert(&self, year: i32, month: u32, target_entries: i32) -> DomainResult<MonthlyTarget>;
}
