// HTTP handlers for tenant-scoped order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::MaybeAuthenticatedUser;
use crate::error::ErrorResponse;
use crate::orders::service::OrderListQuery;
use crate::orders::{
    CreateOrderRequest, OrderError, OrderListResponse, OrderResponse, UpdateStatusRequest,
};
use crate::AppState;

/// Handler for POST /api/tenants/{slug}/orders
/// Converts an open cart into an order for the caller's tenant
#[utoipa::path(
    post,
    path = "/api/tenants/{slug}/orders",
    params(
        ("slug" = String, Path, description = "Tenant slug")
    ),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid input data or empty cart", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a member of the tenant", body = ErrorResponse),
        (status = 404, description = "Tenant or cart not found", body = ErrorResponse),
        (status = 409, description = "Cart already converted or concurrent conflict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeAuthenticatedUser(user): MaybeAuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let response = state
        .order_service
        .create_order(&slug, user.as_ref(), &request)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/tenants/{slug}/orders/{order_id}
/// Retrieves one order with its items
#[utoipa::path(
    get,
    path = "/api/tenants/{slug}/orders/{order_id}",
    params(
        ("slug" = String, Path, description = "Tenant slug"),
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order details", body = OrderResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a member of the tenant", body = ErrorResponse),
        (status = 404, description = "Tenant or order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path((slug, order_id)): Path<(String, Uuid)>,
    MaybeAuthenticatedUser(user): MaybeAuthenticatedUser,
) -> Result<Json<OrderResponse>, OrderError> {
    let response = state
        .order_service
        .get_order(&slug, user.as_ref(), order_id)
        .await?;

    Ok(Json(response))
}

/// Handler for GET /api/tenants/{slug}/orders
/// Lists order summaries, newest first, with optional filters
#[utoipa::path(
    get,
    path = "/api/tenants/{slug}/orders",
    params(
        ("slug" = String, Path, description = "Tenant slug"),
        OrderListQuery
    ),
    responses(
        (status = 200, description = "Paginated order summaries", body = OrderListResponse),
        (status = 400, description = "Invalid filter value", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a member of the tenant", body = ErrorResponse),
        (status = 404, description = "Tenant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeAuthenticatedUser(user): MaybeAuthenticatedUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>, OrderError> {
    let response = state
        .order_service
        .list_orders(&slug, user.as_ref(), &query)
        .await?;

    Ok(Json(response))
}

/// Handler for PATCH /api/tenants/{slug}/orders/{order_id}
/// Applies a status transition to an order
#[utoipa::path(
    patch,
    path = "/api/tenants/{slug}/orders/{order_id}",
    params(
        ("slug" = String, Path, description = "Tenant slug"),
        ("order_id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = OrderResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller's role may not change statuses", body = ErrorResponse),
        (status = 404, description = "Tenant or order not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition or concurrent conflict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status_handler(
    State(state): State<AppState>,
    Path((slug, order_id)): Path<(String, Uuid)>,
    MaybeAuthenticatedUser(user): MaybeAuthenticatedUser,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, OrderError> {
    let response = state
        .order_service
        .update_status(&slug, user.as_ref(), order_id, &request)
        .await?;

    Ok(Json(response))
}
