//! Service orders
//!
//! The central record of the shop: one order per repair job, with a
//! lifecycle status and an optional monetary total once work is quoted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

// =========================================================================
// Order status lifecycle
// =========================================================================

/// Lifecycle status of a service order.
///
/// `Received` is the intake state (what the front desk calls "pending").
/// `Completed`, `Delivered` and `Cancelled` are closed states and never
/// count as active work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Diagnosed,
    AwaitingParts,
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::Diagnosed => "diagnosed",
            OrderStatus::AwaitingParts => "awaiting_parts",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status from its database/wire representation
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "received" => Ok(OrderStatus::Received),
            "diagnosed" => Ok(OrderStatus::Diagnosed),
            "awaiting_parts" => Ok(OrderStatus::AwaitingParts),
            "in_progress" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }

    /// Closed orders no longer count as active work
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }

    /// Check whether a transition from this status to `next` is allowed
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Received => matches!(next, Diagnosed | InProgress | Cancelled),
            Diagnosed => matches!(next, AwaitingParts | InProgress | Cancelled),
            AwaitingParts => matches!(next, InProgress | Cancelled),
            InProgress => matches!(next, Completed | Cancelled),
            Completed => matches!(next, Delivered),
            // Terminal states
            Delivered | Cancelled => false,
        }
    }

    /// Validate a transition, returning the new status on success
    pub fn transition_to(&self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =========================================================================
// Priority
// =========================================================================

/// Priority assigned at intake, used for queue ordering at the bench
/// and as a display hint on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(DomainError::UnknownPriority(other.to_string())),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =========================================================================
// Order record
// =========================================================================

/// A service order as read from the `orders` table.
///
/// `client_name` and `technician_name` are denormalized display fields;
/// either may be absent for rows created before the profile existed, so
/// consumers must fall back to a placeholder rather than fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub priority: Priority,
    pub issue: String,
    pub total: Option<Decimal>,
    pub client_id: Uuid,
    pub technician_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub technician_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether the order carries a non-zero monetary total
    pub fn has_payment(&self) -> bool {
        self.total.map_or(false, |t| !t.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order_with(status: OrderStatus, total: Option<Decimal>) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-000001".to_string(),
            status,
            priority: Priority::Normal,
            issue: "does not boot".to_string(),
            total,
            client_id: Uuid::new_v4(),
            technician_id: None,
            client_name: Some("Maria".to_string()),
            technician_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Received,
            OrderStatus::Diagnosed,
            OrderStatus::AwaitingParts,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }

        assert!(OrderStatus::parse("shipped").is_err());
    }

    #[test]
    fn test_closed_states() {
        assert!(OrderStatus::Completed.is_closed());
        assert!(OrderStatus::Delivered.is_closed());
        assert!(OrderStatus::Cancelled.is_closed());
        assert!(!OrderStatus::Received.is_closed());
        assert!(!OrderStatus::InProgress.is_closed());
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(OrderStatus::Received.can_transition_to(OrderStatus::Diagnosed));
        assert!(OrderStatus::Received.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::Diagnosed.can_transition_to(OrderStatus::AwaitingParts));
        assert!(OrderStatus::AwaitingParts.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Completed.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_rejected_transitions() {
        // No skipping straight to delivered
        assert!(!OrderStatus::Received.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::Delivered));
        // Terminal states stay terminal
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Received));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::InProgress));
        // Completed orders cannot be cancelled
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_transition_to_error_carries_both_states() {
        let err = OrderStatus::Delivered
            .transition_to(OrderStatus::Received)
            .unwrap_err();
        assert!(err.to_string().contains("delivered"));
        assert!(err.to_string().contains("received"));
    }

    #[test]
    fn test_has_payment() {
        assert!(order_with(OrderStatus::Completed, Some(dec!(150))).has_payment());
        assert!(!order_with(OrderStatus::Completed, Some(dec!(0))).has_payment());
        assert!(!order_with(OrderStatus::Completed, None).has_payment());
    }
}
