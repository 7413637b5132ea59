//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{OrderStatus, Priority};

// =========================================================================
// CreateOrderCommand
// =========================================================================

/// Command to check in a new service order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderCommand {
    pub client_id: Uuid,
    /// Problem description taken at the front desk
    pub issue: String,
    pub priority: Priority,
    /// Technician assigned at intake, if any
    pub technician_id: Option<Uuid>,
    /// Equipment record the repair is for, if registered
    pub equipment_id: Option<Uuid>,
}

impl CreateOrderCommand {
    pub fn new(client_id: Uuid, issue: String) -> Self {
        Self {
            client_id,
            issue,
            priority: Priority::Normal,
            technician_id: None,
            equipment_id: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_technician(mut self, technician_id: Uuid) -> Self {
        self.technician_id = Some(technician_id);
        self
    }

    pub fn with_equipment(mut self, equipment_id: Uuid) -> Self {
        self.equipment_id = Some(equipment_id);
        self
    }
}

/// Result of a successful order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResult {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
}

// =========================================================================
// UpdateOrderStatusCommand
// =========================================================================

/// Command to move an order through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusCommand {
    pub order_id: Uuid,
    pub new_status: OrderStatus,
    /// Optional note recorded in the status history
    pub note: Option<String>,
}

impl UpdateOrderStatusCommand {
    pub fn new(order_id: Uuid, new_status: OrderStatus) -> Self {
        Self {
            order_id,
            new_status,
            note: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }
}

/// Result of a successful status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusResult {
    pub order_id: Uuid,
    pub previous_status: OrderStatus,
    pub status: OrderStatus,
}
