//! Notifications
//!
//! Short messages generated by order lifecycle events, client inquiries
//! and stock alerts. They feed the bell icon in the UI and the reception
//! activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, Priority};

/// Category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderReceived,
    OrderCompleted,
    OrderDelivered,
    PaymentRecorded,
    ClientInquiry,
    StockLow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderReceived => "order_received",
            NotificationKind::OrderCompleted => "order_completed",
            NotificationKind::OrderDelivered => "order_delivered",
            NotificationKind::PaymentRecorded => "payment_recorded",
            NotificationKind::ClientInquiry => "client_inquiry",
            NotificationKind::StockLow => "stock_low",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "order_received" => Ok(NotificationKind::OrderReceived),
            "order_completed" => Ok(NotificationKind::OrderCompleted),
            "order_delivered" => Ok(NotificationKind::OrderDelivered),
            "payment_recorded" => Ok(NotificationKind::PaymentRecorded),
            "client_inquiry" => Ok(NotificationKind::ClientInquiry),
            "stock_low" => Ok(NotificationKind::StockLow),
            other => Err(DomainError::UnknownNotificationKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification row as read from the `notifications` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub priority: Priority,
    pub is_read: bool,
    pub order_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
