//! Order Status Handler
//!
//! Moves an order through its lifecycle: enforces the transition graph,
//! appends to the status history, and emits the notifications the
//! dashboards and the bell icon consume.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NotificationKind, OperationContext, OrderStatus, Priority};
use crate::error::AppError;

use super::{UpdateOrderStatusCommand, UpdateOrderStatusResult};

/// Handler for order status changes
pub struct OrderStatusHandler {
    pool: PgPool,
}

impl OrderStatusHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the status change command
    pub async fn execute(
        &self,
        command: UpdateOrderStatusCommand,
        context: &OperationContext,
    ) -> Result<UpdateOrderStatusResult, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so concurrent status changes serialize
        let row: Option<(String, String, Uuid)> = sqlx::query_as(
            "SELECT status, order_number, client_id FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(command.order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (status, order_number, client_id) =
            row.ok_or_else(|| AppError::OrderNotFound(command.order_id.to_string()))?;

        let current = OrderStatus::parse(&status)?;
        let next = current.transition_to(command.new_status)?;

        sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(command.order_id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO order_status_history (id, order_id, from_status, to_status, changed_by, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(command.order_id)
        .bind(current.as_str())
        .bind(next.as_str())
        .bind(context.profile_id)
        .bind(&command.note)
        .execute(&mut *tx)
        .await?;

        if let Some((kind, message)) = notification_for(next, &order_number) {
            sqlx::query(
                r#"
                INSERT INTO notifications (id, kind, message, priority, order_id, client_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(kind.as_str())
            .bind(message)
            .bind(Priority::Normal.as_str())
            .bind(command.order_id)
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %command.order_id,
            from = %current,
            to = %next,
            profile_id = ?context.profile_id,
            "Order status changed"
        );

        Ok(UpdateOrderStatusResult {
            order_id: command.order_id,
            previous_status: current,
            status: next,
        })
    }
}

/// Which notification, if any, a status change produces
fn notification_for(status: OrderStatus, order_number: &str) -> Option<(NotificationKind, String)> {
    match status {
        OrderStatus::Completed => Some((
            NotificationKind::OrderCompleted,
            format!("Order {} is ready for pickup", order_number),
        )),
        OrderStatus::Delivered => Some((
            NotificationKind::OrderDelivered,
            format!("Order {} was delivered", order_number),
        )),
        _ => None,
    }
}
