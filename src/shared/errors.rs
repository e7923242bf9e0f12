use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable(_))
    }

    pub fn ticket_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            entity: "ParkingTicket",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn inspection_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            entity: "VehicleInspection",
            field: "id",
            value: id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        DomainError::StoreUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_errors_are_transient() {
        assert!(DomainError::StoreUnavailable("db down".into()).is_transient());
        assert!(!DomainError::Conflict("dup".into()).is_transient());
        assert!(!DomainError::InvalidInput("bad".into()).is_transient());
        assert!(!DomainError::ticket_not_found("x").is_transient());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = DomainError::ticket_not_found("abc");
        assert_eq!(err.to_string(), "Not found: ParkingTicket with id=abc");
    }

    #[test]
    fn infra_errors_surface_as_store_unavailable() {
        let err: DomainError = InfraError::Config("missing".into()).into();
        assert!(matches!(err, DomainError::StoreUnavailable(_)));

        let db: InfraError = sea_orm::DbErr::Custom("connection reset".into()).into();
        let err: DomainError = db.into();
        assert!(err.is_transient());
        assert!(err.to_string().contains("connection reset"));
    }
}
