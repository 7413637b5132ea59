//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dashboard::{
    build_admin_feed, build_reception_feed, ActivityItem, DashboardQueries, DashboardQueryError,
    FeedSources, OrderStats, ReceptionFeedSources, StaffStats,
};
use crate::domain::{
    DomainError, NotificationKind, OperationContext, OrderStatus, Priority, Role,
};
use crate::error::AppError;
use crate::handlers::{
    CreateOrderCommand, CreateOrderHandler, OrderStatusHandler, UpdateOrderStatusCommand,
};

use super::middleware::AuthenticatedApiKey;

/// How many rows each recent-activity source contributes before the feed
/// builder applies its own caps
const RECENT_SOURCE_LIMIT: i64 = 10;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: Uuid,
    pub issue: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub technician_id: Option<Uuid>,
    #[serde(default)]
    pub equipment_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
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

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub technician_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub technician_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Quoted or charged total; must not be negative
    #[serde(default)]
    pub total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateOrderStatusResponse {
    pub order_id: Uuid,
    pub previous_status: OrderStatus,
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfilesQuery {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub profile_id: Uuid,
    pub last_login_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub priority: Priority,
    pub is_read: bool,
    pub order_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEquipmentRequest {
    pub client_id: Uuid,
    pub kind: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EquipmentResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub kind: String,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EquipmentQuery {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateInventoryItemRequest {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub reorder_level: i32,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct InventoryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub reorder_level: i32,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Positive to restock, negative to consume
    pub delta: i32,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub stats: OrderStats,
    pub staff: StaffStats,
    pub feed: Vec<ActivityItem>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReceptionDashboardResponse {
    pub stats: OrderStats,
    pub feed: Vec<ActivityItem>,
    pub generated_at: DateTime<Utc>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Orders
        .route("/orders", post(create_order))
        .route("/orders", get(list_orders))
        .route("/orders/:order_id", get(get_order))
        .route("/orders/:order_id", patch(update_order))
        .route("/orders/:order_id/status", patch(update_order_status))
        // Profiles
        .route("/profiles", post(create_profile))
        .route("/profiles", get(list_profiles))
        .route("/profiles/:profile_id", get(get_profile))
        .route("/profiles/:profile_id", patch(update_profile))
        .route("/profiles/:profile_id", delete(deactivate_profile))
        .route("/profiles/:profile_id/login", post(record_login))
        // Notifications
        .route("/notifications", get(list_notifications))
        .route("/notifications", post(create_notification))
        .route("/notifications/:notification_id/read", post(mark_notification_read))
        // Equipment
        .route("/equipment", post(create_equipment))
        .route("/equipment", get(list_equipment))
        .route("/equipment/:equipment_id", get(get_equipment))
        // Inventory
        .route("/inventory", get(list_inventory))
        .route("/inventory", post(create_inventory_item))
        .route("/inventory/:item_id/stock", patch(adjust_stock))
        // Dashboards
        .route("/dashboard/admin", get(admin_dashboard))
        .route("/dashboard/reception", get(reception_dashboard))
}

// =========================================================================
// Orders
// =========================================================================

/// Check in a new service order
async fn create_order(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let handler = CreateOrderHandler::new(pool);

    let mut command = CreateOrderCommand::new(request.client_id, request.issue);
    if let Some(priority) = request.priority {
        command = command.with_priority(priority);
    }
    if let Some(technician_id) = request.technician_id {
        command = command.with_technician(technician_id);
    }
    if let Some(equipment_id) = request.equipment_id {
        command = command.with_equipment(equipment_id);
    }

    let result = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: result.order_id,
            order_number: result.order_number,
            status: result.status,
        }),
    ))
}

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

fn order_response_from_row(row: OrderRow) -> Result<OrderResponse, AppError> {
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

    Ok(OrderResponse {
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

/// List orders with optional status/client/technician filters
async fn list_orders(
    State(pool): State<PgPool>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    // Validate the status filter up front so a typo reads as a 400, not
    // an empty list
    if let Some(ref status) = query.status {
        OrderStatus::parse(status)?;
    }

    let limit = query.limit.clamp(1, 500);

    let rows: Vec<OrderRow> = sqlx::query_as(
        r#"
        SELECT o.id, o.order_number, o.status, o.priority, o.issue, o.total,
               o.client_id, o.technician_id, c.display_name, t.display_name,
               o.created_at, o.updated_at
        FROM orders o
        LEFT JOIN profiles c ON c.id = o.client_id
        LEFT JOIN profiles t ON t.id = o.technician_id
        WHERE ($1::text IS NULL OR o.status = $1)
          AND ($2::uuid IS NULL OR o.client_id = $2)
          AND ($3::uuid IS NULL OR o.technician_id = $3)
        ORDER BY o.created_at DESC
        LIMIT $4
        "#,
    )
    .bind(&query.status)
    .bind(query.client_id)
    .bind(query.technician_id)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(order_response_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

/// Get order by ID
async fn get_order(
    State(pool): State<PgPool>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let row: Option<OrderRow> = sqlx::query_as(
        r#"
        SELECT o.id, o.order_number, o.status, o.priority, o.issue, o.total,
               o.client_id, o.technician_id, c.display_name, t.display_name,
               o.created_at, o.updated_at
        FROM orders o
        LEFT JOIN profiles c ON c.id = o.client_id
        LEFT JOIN profiles t ON t.id = o.technician_id
        WHERE o.id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(&pool)
    .await?;

    let row = row.ok_or_else(|| AppError::OrderNotFound(order_id.to_string()))?;
    Ok(Json(order_response_from_row(row)?))
}

/// Update order assignment, priority or total
async fn update_order(
    State(pool): State<PgPool>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    if let Some(total) = request.total {
        if total.is_sign_negative() {
            return Err(AppError::Domain(DomainError::InvalidAmount(
                total.to_string(),
            )));
        }
    }

    if let Some(technician_id) = request.technician_id {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1 AND is_active")
                .bind(technician_id)
                .fetch_optional(&pool)
                .await?;

        let role = role.ok_or_else(|| AppError::ProfileNotFound(technician_id.to_string()))?;
        if Role::parse(&role)? != Role::Technician {
            return Err(AppError::Domain(DomainError::WrongRole {
                expected: "technician".to_string(),
                found: role,
            }));
        }
    }

    let updated = sqlx::query(
        r#"
        UPDATE orders
        SET technician_id = COALESCE($2, technician_id),
            priority = COALESCE($3, priority),
            total = COALESCE($4, total),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(order_id)
    .bind(request.technician_id)
    .bind(request.priority.map(|p| p.as_str()))
    .bind(request.total)
    .execute(&pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::OrderNotFound(order_id.to_string()));
    }

    get_order(State(pool), Path(order_id)).await
}

/// Move an order through its lifecycle
async fn update_order_status(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<UpdateOrderStatusResponse>, AppError> {
    let handler = OrderStatusHandler::new(pool);

    let mut command = UpdateOrderStatusCommand::new(order_id, request.status);
    if let Some(note) = request.note {
        command = command.with_note(note);
    }

    let result = handler.execute(command, &context).await?;

    Ok(Json(UpdateOrderStatusResponse {
        order_id: result.order_id,
        previous_status: result.previous_status,
        status: result.status,
    }))
}

// =========================================================================
// Profiles
// =========================================================================

type ProfileRow = (
    Uuid,
    String,
    String,
    String,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn profile_response_from_row(row: ProfileRow) -> Result<ProfileResponse, AppError> {
    let (id, display_name, email, role, is_active, created_at, last_login_at) = row;

    Ok(ProfileResponse {
        id,
        display_name,
        email,
        role: Role::parse(&role)?,
        is_active,
        created_at,
        last_login_at,
    })
}

/// Create a profile
async fn create_profile(
    State(pool): State<PgPool>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    if request.display_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Display name must not be empty".to_string(),
        ));
    }

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM profiles WHERE email = $1")
        .bind(&request.email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::InvalidRequest(
            "A profile with this email already exists".to_string(),
        ));
    }

    let id = Uuid::new_v4();
    let row: ProfileRow = sqlx::query_as(
        r#"
        INSERT INTO profiles (id, display_name, email, role, is_active, created_at)
        VALUES ($1, $2, $3, $4, true, NOW())
        RETURNING id, display_name, email, role, is_active, created_at, last_login_at
        "#,
    )
    .bind(id)
    .bind(&request.display_name)
    .bind(&request.email)
    .bind(request.role.as_str())
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(profile_response_from_row(row)?)))
}

/// List profiles, optionally by role
async fn list_profiles(
    State(pool): State<PgPool>,
    Query(query): Query<ProfilesQuery>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let limit = query.limit.clamp(1, 500);

    let rows: Vec<ProfileRow> = sqlx::query_as(
        r#"
        SELECT id, display_name, email, role, is_active, created_at, last_login_at
        FROM profiles
        WHERE ($1::text IS NULL OR role = $1)
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(query.role.map(|r| r.as_str()))
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(profile_response_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

/// Get profile by ID
async fn get_profile(
    State(pool): State<PgPool>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let row: Option<ProfileRow> = sqlx::query_as(
        r#"
        SELECT id, display_name, email, role, is_active, created_at, last_login_at
        FROM profiles
        WHERE id = $1
        "#,
    )
    .bind(profile_id)
    .fetch_optional(&pool)
    .await?;

    let row = row.ok_or_else(|| AppError::ProfileNotFound(profile_id.to_string()))?;
    Ok(Json(profile_response_from_row(row)?))
}

/// Update profile display name or email
async fn update_profile(
    State(pool): State<PgPool>,
    Path(profile_id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let updated = sqlx::query(
        r#"
        UPDATE profiles
        SET display_name = COALESCE($2, display_name),
            email = COALESCE($3, email)
        WHERE id = $1
        "#,
    )
    .bind(profile_id)
    .bind(&request.display_name)
    .bind(&request.email)
    .execute(&pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::ProfileNotFound(profile_id.to_string()));
    }

    get_profile(State(pool), Path(profile_id)).await
}

/// Deactivate a profile (soft delete)
async fn deactivate_profile(
    State(pool): State<PgPool>,
    Path(profile_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let updated = sqlx::query("UPDATE profiles SET is_active = false WHERE id = $1")
        .bind(profile_id)
        .execute(&pool)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(AppError::ProfileNotFound(profile_id.to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Stamp a sign-in. These stamps are the login-event source for the
/// administrator activity feed.
async fn record_login(
    State(pool): State<PgPool>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<LoginResponse>, AppError> {
    let last_login_at: Option<DateTime<Utc>> = sqlx::query_scalar(
        r#"
        UPDATE profiles
        SET last_login_at = NOW()
        WHERE id = $1 AND is_active
        RETURNING last_login_at
        "#,
    )
    .bind(profile_id)
    .fetch_optional(&pool)
    .await?
    .flatten();

    let last_login_at =
        last_login_at.ok_or_else(|| AppError::ProfileNotFound(profile_id.to_string()))?;

    Ok(Json(LoginResponse {
        profile_id,
        last_login_at,
    }))
}

// =========================================================================
// Notifications
// =========================================================================

type NotificationRow = (
    Uuid,
    String,
    String,
    String,
    bool,
    Option<Uuid>,
    Option<Uuid>,
    DateTime<Utc>,
);

fn notification_response_from_row(row: NotificationRow) -> Result<NotificationResponse, AppError> {
    let (id, kind, message, priority, is_read, order_id, client_id, created_at) = row;

    Ok(NotificationResponse {
        id,
        kind: NotificationKind::parse(&kind)?,
        message,
        priority: Priority::parse(&priority)?,
        is_read,
        order_id,
        client_id,
        created_at,
    })
}

/// List recent notifications
async fn list_notifications(
    State(pool): State<PgPool>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let limit = query.limit.clamp(1, 500);

    let rows: Vec<NotificationRow> = sqlx::query_as(
        r#"
        SELECT id, kind, message, priority, is_read, order_id, client_id, created_at
        FROM notifications
        WHERE (NOT $1 OR is_read = false)
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(query.unread_only)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    rows.into_iter()
        .map(notification_response_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

/// Create a notification (client inquiries from the front desk, mostly)
async fn create_notification(
    State(pool): State<PgPool>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Message must not be empty".to_string(),
        ));
    }

    let priority = request.priority.unwrap_or_default();

    let row: NotificationRow = sqlx::query_as(
        r#"
        INSERT INTO notifications (id, kind, message, priority, order_id, client_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, kind, message, priority, is_read, order_id, client_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.kind.as_str())
    .bind(&request.message)
    .bind(priority.as_str())
    .bind(request.order_id)
    .bind(request.client_id)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(notification_response_from_row(row)?),
    ))
}

/// Mark a notification as read
async fn mark_notification_read(
    State(pool): State<PgPool>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let updated = sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1")
        .bind(notification_id)
        .execute(&pool)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(AppError::NotificationNotFound(notification_id.to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Equipment
// =========================================================================

type EquipmentRow = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
);

fn equipment_response_from_row(row: EquipmentRow) -> EquipmentResponse {
    let (id, client_id, kind, brand, model, serial_number, created_at) = row;

    EquipmentResponse {
        id,
        client_id,
        kind,
        brand,
        model,
        serial_number,
        created_at,
    }
}

/// Register a piece of client equipment
async fn create_equipment(
    State(pool): State<PgPool>,
    Json(request): Json<CreateEquipmentRequest>,
) -> Result<(StatusCode, Json<EquipmentResponse>), AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1 AND is_active)")
            .bind(request.client_id)
            .fetch_one(&pool)
            .await?;

    if !exists {
        return Err(AppError::ProfileNotFound(request.client_id.to_string()));
    }

    let row: EquipmentRow = sqlx::query_as(
        r#"
        INSERT INTO equipment (id, client_id, kind, brand, model, serial_number)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, client_id, kind, brand, model, serial_number, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.client_id)
    .bind(&request.kind)
    .bind(&request.brand)
    .bind(&request.model)
    .bind(&request.serial_number)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(equipment_response_from_row(row))))
}

/// List equipment, optionally for one client
async fn list_equipment(
    State(pool): State<PgPool>,
    Query(query): Query<EquipmentQuery>,
) -> Result<Json<Vec<EquipmentResponse>>, AppError> {
    let limit = query.limit.clamp(1, 500);

    let rows: Vec<EquipmentRow> = sqlx::query_as(
        r#"
        SELECT id, client_id, kind, brand, model, serial_number, created_at
        FROM equipment
        WHERE ($1::uuid IS NULL OR client_id = $1)
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(query.client_id)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(
        rows.into_iter().map(equipment_response_from_row).collect(),
    ))
}

/// Get equipment by ID
async fn get_equipment(
    State(pool): State<PgPool>,
    Path(equipment_id): Path<Uuid>,
) -> Result<Json<EquipmentResponse>, AppError> {
    let row: Option<EquipmentRow> = sqlx::query_as(
        r#"
        SELECT id, client_id, kind, brand, model, serial_number, created_at
        FROM equipment
        WHERE id = $1
        "#,
    )
    .bind(equipment_id)
    .fetch_optional(&pool)
    .await?;

    let row = row.ok_or_else(|| AppError::EquipmentNotFound(equipment_id.to_string()))?;
    Ok(Json(equipment_response_from_row(row)))
}

// =========================================================================
// Inventory
// =========================================================================

type InventoryRow = (Uuid, String, String, i32, i32, Option<Decimal>);

fn inventory_response_from_row(row: InventoryRow) -> InventoryItemResponse {
    let (id, name, sku, quantity, reorder_level, unit_cost) = row;

    InventoryItemResponse {
        id,
        name,
        sku,
        quantity,
        reorder_level,
        unit_cost,
    }
}

/// List inventory items
async fn list_inventory(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<InventoryItemResponse>>, AppError> {
    let rows: Vec<InventoryRow> = sqlx::query_as(
        r#"
        SELECT id, name, sku, quantity, reorder_level, unit_cost
        FROM inventory_items
        ORDER BY name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(
        rows.into_iter().map(inventory_response_from_row).collect(),
    ))
}

/// Create an inventory item
async fn create_inventory_item(
    State(pool): State<PgPool>,
    Json(request): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<InventoryItemResponse>), AppError> {
    if request.quantity < 0 || request.reorder_level < 0 {
        return Err(AppError::InvalidRequest(
            "Quantity and reorder level must not be negative".to_string(),
        ));
    }

    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM inventory_items WHERE sku = $1")
            .bind(&request.sku)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::InvalidRequest(
            "An item with this SKU already exists".to_string(),
        ));
    }

    let row: InventoryRow = sqlx::query_as(
        r#"
        INSERT INTO inventory_items (id, name, sku, quantity, reorder_level, unit_cost)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, sku, quantity, reorder_level, unit_cost
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.name)
    .bind(&request.sku)
    .bind(request.quantity)
    .bind(request.reorder_level)
    .bind(request.unit_cost)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(inventory_response_from_row(row))))
}

/// Adjust stock by a delta; emits a stock_low notification when a
/// consumption leaves the item at or below its reorder level
async fn adjust_stock(
    State(pool): State<PgPool>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<InventoryItemResponse>, AppError> {
    let mut tx = pool.begin().await?;

    let row: Option<(String, i32, i32)> = sqlx::query_as(
        "SELECT name, quantity, reorder_level FROM inventory_items WHERE id = $1 FOR UPDATE",
    )
    .bind(item_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (name, quantity, reorder_level) =
        row.ok_or_else(|| AppError::InventoryItemNotFound(item_id.to_string()))?;

    let new_quantity = quantity + request.delta;
    if new_quantity < 0 {
        return Err(AppError::Domain(DomainError::InsufficientStock {
            requested: -request.delta,
            available: quantity,
        }));
    }

    let row: InventoryRow = sqlx::query_as(
        r#"
        UPDATE inventory_items
        SET quantity = $2
        WHERE id = $1
        RETURNING id, name, sku, quantity, reorder_level, unit_cost
        "#,
    )
    .bind(item_id)
    .bind(new_quantity)
    .fetch_one(&mut *tx)
    .await?;

    if request.delta < 0 && new_quantity <= reorder_level {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, kind, message, priority)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(NotificationKind::StockLow.as_str())
        .bind(format!("Stock low: {} ({} left)", name, new_quantity))
        .bind(Priority::High.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(inventory_response_from_row(row)))
}

// =========================================================================
// Dashboards
// =========================================================================

/// Substitute an empty snapshot for a failed source read: a partial
/// dashboard beats a hard failure
fn or_empty<T>(result: Result<Vec<T>, DashboardQueryError>, source: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(source = source, error = %e, "Dashboard source fetch failed");
            Vec::new()
        }
    }
}

/// Administrator dashboard: full counters plus the activity feed
async fn admin_dashboard(
    State(pool): State<PgPool>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
) -> Result<Json<AdminDashboardResponse>, AppError> {
    if !api_key.has_permission("admin") {
        return Err(AppError::Forbidden("admin permission required".to_string()));
    }

    let queries = DashboardQueries::new(pool);

    let (all_orders, all_profiles, recent_orders, recent_clients, recent_logins, delivered) = tokio::join!(
        queries.all_orders(),
        queries.all_profiles(),
        queries.recent_orders(RECENT_SOURCE_LIMIT),
        queries.recent_clients(RECENT_SOURCE_LIMIT),
        queries.recent_logins(RECENT_SOURCE_LIMIT),
        queries.recently_delivered(RECENT_SOURCE_LIMIT),
    );

    let all_orders = or_empty(all_orders, "orders");
    let all_profiles = or_empty(all_profiles, "profiles");
    let recent_orders = or_empty(recent_orders, "recent_orders");
    let recent_clients = or_empty(recent_clients, "recent_clients");
    let recent_logins = or_empty(recent_logins, "recent_logins");
    let delivered = or_empty(delivered, "recently_delivered");

    let now = Utc::now();
    let sources = FeedSources {
        recent_orders: &recent_orders,
        new_registrations: &recent_clients,
        recent_logins: &recent_logins,
        delivered_orders: &delivered,
    };

    Ok(Json(AdminDashboardResponse {
        stats: OrderStats::compute(&all_orders),
        staff: StaffStats::compute(&all_profiles),
        feed: build_admin_feed(&sources, now),
        generated_at: now,
    }))
}

/// Reception dashboard: counters plus the front-desk feed
async fn reception_dashboard(
    State(pool): State<PgPool>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
) -> Result<Json<ReceptionDashboardResponse>, AppError> {
    if !api_key.has_permission("reception") {
        return Err(AppError::Forbidden(
            "reception permission required".to_string(),
        ));
    }

    let queries = DashboardQueries::new(pool);

    let (all_orders, recent_orders, recent_clients, inquiries, delivered) = tokio::join!(
        queries.all_orders(),
        queries.recent_orders(RECENT_SOURCE_LIMIT),
        queries.recent_clients(RECENT_SOURCE_LIMIT),
        queries.recent_inquiries(RECENT_SOURCE_LIMIT),
        queries.recently_delivered(RECENT_SOURCE_LIMIT),
    );

    let all_orders = or_empty(all_orders, "orders");
    let recent_orders = or_empty(recent_orders, "recent_orders");
    let recent_clients = or_empty(recent_clients, "recent_clients");
    let inquiries = or_empty(inquiries, "inquiries");
    let delivered = or_empty(delivered, "recently_delivered");

    let now = Utc::now();
    let sources = ReceptionFeedSources {
        recent_orders: &recent_orders,
        new_registrations: &recent_clients,
        inquiries: &inquiries,
        delivered_orders: &delivered,
    };

    Ok(Json(ReceptionDashboardResponse {
        stats: OrderStats::compute(&all_orders),
        feed: build_reception_feed(&sources, now),
        generated_at: now,
    }))
}
