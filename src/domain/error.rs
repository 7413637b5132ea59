//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::order::OrderStatus;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Status change not allowed by the order lifecycle
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Status string not in the lifecycle enumeration
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Role string not in the role enumeration
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Priority string not recognized
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    /// Notification kind string not recognized
    #[error("Unknown notification kind: {0}")]
    UnknownNotificationKind(String),

    /// Invalid monetary amount (negative or unparseable)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Stock adjustment would take an inventory item below zero
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    /// Operation requires a profile with a different role
    #[error("Wrong role: expected {expected}, found {found}")]
    WrongRole { expected: String, found: String },
}

impl DomainError {
    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::InvalidAmount(_)
                | Self::InsufficientStock { .. }
                | Self::WrongRole { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = DomainError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::InProgress,
        };

        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Invalid status transition: delivered -> in_progress"
        );
    }

    #[test]
    fn test_insufficient_stock_error() {
        let err = DomainError::InsufficientStock {
            requested: 5,
            available: 2,
        };

        assert!(err.is_client_error());
        assert!(err.to_string().contains("requested 5"));
        assert!(err.to_string().contains("available 2"));
    }

    #[test]
    fn test_unknown_status_is_not_client_error() {
        // Unknown strings coming out of the database are a data problem,
        // not a caller problem.
        assert!(!DomainError::UnknownStatus("shipped".to_string()).is_client_error());
    }
}
