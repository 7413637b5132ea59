//! Summary counters
//!
//! Pure aggregation over already-fetched rows. The dashboard endpoints
//! fetch the rows and hand them here; nothing in this module touches the
//! database or mutates its inputs.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Order, OrderStatus, Profile, Role};

/// Counters shown on the summary cards of the order dashboard.
///
/// Invariants: `total` equals the input length; the per-status buckets are
/// mutually exclusive and sum to `total`; `active` is `total` minus the
/// closed buckets. An empty input yields the all-zero struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: u64,
    pub active: u64,
    pub pending: u64,
    pub diagnosed: u64,
    pub awaiting_parts: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub delivered: u64,
    pub cancelled: u64,
    /// Sum of order totals over completed and delivered orders
    pub revenue: Decimal,
}

impl OrderStats {
    /// Compute counters from a snapshot of order rows
    pub fn compute(orders: &[Order]) -> Self {
        let mut stats = OrderStats::default();

        for order in orders {
            stats.total += 1;
            match order.status {
                OrderStatus::Received => stats.pending += 1,
                OrderStatus::Diagnosed => stats.diagnosed += 1,
                OrderStatus::AwaitingParts => stats.awaiting_parts += 1,
                OrderStatus::InProgress => stats.in_progress += 1,
                OrderStatus::Completed => stats.completed += 1,
                OrderStatus::Delivered => stats.delivered += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
            if !order.status.is_closed() {
                stats.active += 1;
            }
            if matches!(order.status, OrderStatus::Completed | OrderStatus::Delivered) {
                if let Some(total) = order.total {
                    stats.revenue += total;
                }
            }
        }

        stats
    }
}

/// Headcount counters computed over profile rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaffStats {
    pub total_clients: u64,
    pub total_technicians: u64,
}

impl StaffStats {
    /// Compute headcounts from a snapshot of profile rows
    pub fn compute(profiles: &[Profile]) -> Self {
        let mut stats = StaffStats::default();

        for profile in profiles {
            match profile.role {
                Role::Client => stats.total_clients += 1,
                Role::Technician => stats.total_technicians += 1,
                Role::Admin | Role::Receptionist => {}
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order(status: OrderStatus, total: Option<Decimal>) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-000001".to_string(),
            status,
            priority: crate::domain::Priority::Normal,
            issue: "screen flicker".to_string(),
            total,
            client_id: Uuid::new_v4(),
            technician_id: None,
            client_name: None,
            technician_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile(role: Role) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            display_name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_empty_input_yields_all_zero() {
        let stats = OrderStats::compute(&[]);
        assert_eq!(stats, OrderStats::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.revenue, Decimal::ZERO);
    }

    #[test]
    fn test_total_equals_input_length() {
        let orders = vec![
            order(OrderStatus::Received, None),
            order(OrderStatus::InProgress, None),
            order(OrderStatus::Completed, Some(dec!(100))),
            order(OrderStatus::Delivered, Some(dec!(50))),
            order(OrderStatus::Cancelled, None),
        ];

        let stats = OrderStats::compute(&orders);
        assert_eq!(stats.total, orders.len() as u64);
    }

    #[test]
    fn test_buckets_partition_total() {
        let orders = vec![
            order(OrderStatus::Received, None),
            order(OrderStatus::Received, None),
            order(OrderStatus::Diagnosed, None),
            order(OrderStatus::AwaitingParts, None),
            order(OrderStatus::InProgress, None),
            order(OrderStatus::Completed, None),
            order(OrderStatus::Delivered, None),
            order(OrderStatus::Cancelled, None),
        ];

        let stats = OrderStats::compute(&orders);
        let bucket_sum = stats.pending
            + stats.diagnosed
            + stats.awaiting_parts
            + stats.in_progress
            + stats.completed
            + stats.delivered
            + stats.cancelled;
        assert_eq!(bucket_sum, stats.total);
        assert_eq!(stats.pending, 2);
    }

    #[test]
    fn test_active_excludes_closed_states() {
        let orders = vec![
            order(OrderStatus::Received, None),
            order(OrderStatus::InProgress, None),
            order(OrderStatus::AwaitingParts, None),
            order(OrderStatus::Completed, None),
            order(OrderStatus::Delivered, None),
            order(OrderStatus::Cancelled, None),
        ];

        let stats = OrderStats::compute(&orders);
        assert_eq!(
            stats.active,
            stats.total - (stats.completed + stats.delivered + stats.cancelled)
        );
        assert_eq!(stats.active, 3);
    }

    #[test]
    fn test_revenue_sums_closed_paid_orders_only() {
        let orders = vec![
            // In-flight money does not count yet
            order(OrderStatus::InProgress, Some(dec!(999))),
            order(OrderStatus::Completed, Some(dec!(150))),
            order(OrderStatus::Delivered, Some(dec!(75.50))),
            order(OrderStatus::Delivered, None),
            order(OrderStatus::Cancelled, Some(dec!(40))),
        ];

        let stats = OrderStats::compute(&orders);
        assert_eq!(stats.revenue, dec!(225.50));
    }

    #[test]
    fn test_staff_stats_role_filters() {
        let profiles = vec![
            profile(Role::Client),
            profile(Role::Client),
            profile(Role::Client),
            profile(Role::Technician),
            profile(Role::Technician),
            profile(Role::Admin),
            profile(Role::Receptionist),
        ];

        let stats = StaffStats::compute(&profiles);
        assert_eq!(stats.total_clients, 3);
        assert_eq!(stats.total_technicians, 2);
    }

    #[test]
    fn test_staff_stats_empty() {
        assert_eq!(StaffStats::compute(&[]), StaffStats::default());
    }
}
