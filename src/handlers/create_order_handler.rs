//! Order Creation Handler
//!
//! Checks in a new service order: validates the client, generates an
//! order number, and records the intake notification in one transaction.

use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, NotificationKind, OperationContext, OrderStatus, Role};
use crate::error::AppError;

use super::{CreateOrderCommand, CreateOrderResult};

/// Attempts to find a free order number before giving up
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Handler for order creation
pub struct CreateOrderHandler {
    pool: PgPool,
}

impl CreateOrderHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the create order command
    pub async fn execute(
        &self,
        command: CreateOrderCommand,
        context: &OperationContext,
    ) -> Result<CreateOrderResult, AppError> {
        if command.issue.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Issue description must not be empty".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // The order must belong to an active client profile
        let client: Option<(String, bool)> =
            sqlx::query_as("SELECT role, is_active FROM profiles WHERE id = $1")
                .bind(command.client_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (role, is_active) =
            client.ok_or_else(|| AppError::ProfileNotFound(command.client_id.to_string()))?;

        if !is_active {
            return Err(AppError::InvalidRequest(
                "Client profile is deactivated".to_string(),
            ));
        }

        if Role::parse(&role)? != Role::Client {
            return Err(AppError::Domain(DomainError::WrongRole {
                expected: "client".to_string(),
                found: role,
            }));
        }

        // Technician, when assigned at intake, must hold the technician role
        if let Some(technician_id) = command.technician_id {
            let tech_role: Option<String> =
                sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1 AND is_active")
                    .bind(technician_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let tech_role =
                tech_role.ok_or_else(|| AppError::ProfileNotFound(technician_id.to_string()))?;

            if Role::parse(&tech_role)? != Role::Technician {
                return Err(AppError::Domain(DomainError::WrongRole {
                    expected: "technician".to_string(),
                    found: tech_role,
                }));
            }
        }

        if let Some(equipment_id) = command.equipment_id {
            let owned: Option<Uuid> =
                sqlx::query_scalar("SELECT client_id FROM equipment WHERE id = $1")
                    .bind(equipment_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            match owned {
                None => return Err(AppError::EquipmentNotFound(equipment_id.to_string())),
                Some(owner) if owner != command.client_id => {
                    return Err(AppError::InvalidRequest(
                        "Equipment belongs to a different client".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }

        let order_id = Uuid::new_v4();
        let order_number = self.reserve_order_number(&mut tx).await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, status, priority, issue, client_id,
                technician_id, equipment_id, created_at, updated_at
            )
            VALUES ($1, $2, 'received', $3, $4, $5, $6, $7, NOW(), NOW())
            "#,
        )
        .bind(order_id)
        .bind(&order_number)
        .bind(command.priority.as_str())
        .bind(&command.issue)
        .bind(command.client_id)
        .bind(command.technician_id)
        .bind(command.equipment_id)
        .execute(&mut *tx)
        .await?;

        // Intake notification for the staff feed
        sqlx::query(
            r#"
            INSERT INTO notifications (id, kind, message, priority, order_id, client_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(NotificationKind::OrderReceived.as_str())
        .bind(format!("Order {} checked in", order_number))
        .bind(command.priority.as_str())
        .bind(order_id)
        .bind(command.client_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            order_number = %order_number,
            client_id = %command.client_id,
            profile_id = ?context.profile_id,
            "Order created"
        );

        Ok(CreateOrderResult {
            order_id,
            order_number,
            status: OrderStatus::Received,
        })
    }

    /// Generate a random ORD-NNNNNN number not yet taken
    async fn reserve_order_number(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<String, AppError> {
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = generate_order_number();

            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE order_number = $1)")
                    .bind(&candidate)
                    .fetch_one(&mut **tx)
                    .await?;

            if !taken {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal(
            "Could not allocate a unique order number".to_string(),
        ))
    }
}

/// Random six-digit order number with the display prefix
fn generate_order_number() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("ORD-{:06}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_format() {
        for _ in 0..100 {
            let number = generate_order_number();
            assert!(number.starts_with("ORD-"));
            assert_eq!(number.len(), 10);
            assert!(number[4..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
