//! Bounded store calls shared by the services

use std::future::Future;
use std::time::Duration as StdDuration;

use tracing::warn;

use crate::domain::{DomainError, DomainResult};

/// Await `call`, giving up after `limit`. An elapsed limit surfaces as
/// `StoreUnavailable`; `None` waits forever.
pub(crate) async fn bounded<T, F>(
    limit: Option<StdDuration>,
    operation: &'static str,
    call: F,
) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    let Some(limit) = limit else {
        return call.await;
    };

    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Store call timed out");
            Err(DomainError::StoreUnavailable(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}
