//! Dashboard read queries
//!
//! Fetches the row snapshots the pure aggregator consumes. Counters are
//! computed over the fetched rows, not with SQL aggregates, so the
//! numbers on the cards always match the rows behind them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    DomainError, Notification, NotificationKind, Order, OrderStatus, Priority, Profile, Role,
};

type OrderRow = (
    Uuid,
    String,
    String,
    String,
    String,
    Option<Decimal>,
    Uuid,
    Option<Uuid>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

type ProfileRow = (
    Uuid,
    String,
    String,
    String,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

const ORDER_COLUMNS: &str = "o.id, o.order_number, o.status, o.priority, o.issue, o.total, \
     o.client_id, o.technician_id, c.display_name, t.display_name, o.created_at, o.updated_at";

/// Read-side queries backing the dashboard endpoints
#[derive(Debug, Clone)]
pub struct DashboardQueries {
    pool: PgPool,
}

impl DashboardQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full order snapshot for the summary counters
    pub async fn all_orders(&self) -> Result<Vec<Order>, DashboardQueryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN profiles c ON c.id = o.client_id
            LEFT JOIN profiles t ON t.id = o.technician_id
            ORDER BY o.created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(order_from_row).collect()
    }

    /// Full profile snapshot for the headcount counters
    pub async fn all_profiles(&self) -> Result<Vec<Profile>, DashboardQueryError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, display_name, email, role, is_active, created_at, last_login_at
            FROM profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(profile_from_row).collect()
    }

    /// Most recently created orders, newest first
    pub async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, DashboardQueryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN profiles c ON c.id = o.client_id
            LEFT JOIN profiles t ON t.id = o.technician_id
            ORDER BY o.created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(order_from_row).collect()
    }

    /// Most recently registered client profiles, newest first
    pub async fn recent_clients(&self, limit: i64) -> Result<Vec<Profile>, DashboardQueryError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, display_name, email, role, is_active, created_at, last_login_at
            FROM profiles
            WHERE role = 'client'
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(profile_from_row).collect()
    }

    /// Profiles with the freshest login stamps, newest first
    pub async fn recent_logins(&self, limit: i64) -> Result<Vec<Profile>, DashboardQueryError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, display_name, email, role, is_active, created_at, last_login_at
            FROM profiles
            WHERE last_login_at IS NOT NULL
            ORDER BY last_login_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(profile_from_row).collect()
    }

    /// Orders most recently moved to delivered, newest first
    pub async fn recently_delivered(&self, limit: i64) -> Result<Vec<Order>, DashboardQueryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN profiles c ON c.id = o.client_id
            LEFT JOIN profiles t ON t.id = o.technician_id
            WHERE o.status = 'delivered'
            ORDER BY o.updated_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(order_from_row).collect()
    }

    /// Unread client-inquiry notifications, newest first
    pub async fn recent_inquiries(
        &self,
        limit: i64,
    ) -> Result<Vec<Notification>, DashboardQueryError> {
        let rows: Vec<(
            Uuid,
            String,
            String,
            String,
            bool,
            Option<Uuid>,
            Option<Uuid>,
            DateTime<Utc>,
        )> = sqlx::query_as(
            r#"
            SELECT id, kind, message, priority, is_read, order_id, client_id, created_at
            FROM notifications
            WHERE kind = 'client_inquiry' AND is_read = false
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(
                |(id, kind, message, priority, is_read, order_id, client_id, created_at)| {
                    Ok(Notification {
                        id,
                        kind: NotificationKind::parse(&kind)?,
                        message,
                        priority: Priority::parse(&priority)?,
                        is_read,
                        order_id,
                        client_id,
                        created_at,
                    })
                },
            )
            .collect()
    }
}

fn order_from_row(row: OrderRow) -> Result<Order, DashboardQueryError> {
    let (
        id,
        order_number,
        status,
        priority,
        issue,
        total,
        client_id,
        technician_id,
        client_name,
        technician_name,
        created_at,
        updated_at,
    ) = row;

    Ok(Order {
        id,
        order_number,
        status: OrderStatus::parse(&status)?,
        priority: Priority::parse(&priority)?,
        issue,
        total,
        client_id,
        technician_id,
        client_name,
        technician_name,
        created_at,
        updated_at,
    })
}

fn profile_from_row(row: ProfileRow) -> Result<Profile, DashboardQueryError> {
    let (id, display_name, email, role, is_active, created_at, last_login_at) = row;

    Ok(Profile {
        id,
        display_name,
        email,
        role: Role::parse(&role)?,
        is_active,
        created_at,
        last_login_at,
    })
}

/// Dashboard query errors
#[derive(Debug, thiserror::Error)]
pub enum DashboardQueryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_row_parses_status_and_priority() {
        let id = Uuid::new_v4();
        let client_id = Uuid::new_v4();
        let now = Utc::now();
        let order = order_from_row((
            id,
            "ORD-000123".to_string(),
            "in_progress".to_string(),
            "high".to_string(),
            "keyboard replacement".to_string(),
            None,
            client_id,
            None,
            Some("Maria".to_string()),
            None,
            now,
            now,
        ))
        .unwrap();

        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.priority, Priority::High);
        assert_eq!(order.client_name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_order_from_row_rejects_unknown_status() {
        let now = Utc::now();
        let err = order_from_row((
            Uuid::new_v4(),
            "ORD-000124".to_string(),
            "shipped".to_string(),
            "normal".to_string(),
            String::new(),
            None,
            Uuid::new_v4(),
            None,
            None,
            None,
            now,
            now,
        ))
        .unwrap_err();

        assert!(matches!(
            err,
            DashboardQueryError::Domain(DomainError::UnknownStatus(_))
        ));
    }
}
