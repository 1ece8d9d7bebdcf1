use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::orders::dtos::{CheckoutDto, OrderDetailDto, OrderSummaryDto};
use crate::features::orders::services::OrderService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Place an order from the current cart
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutDto,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderDetailDto>),
        (status = 400, description = "Validation error, empty cart or not enough stock"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "orders",
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    user: AuthenticatedUser,
    State(service): State<Arc<OrderService>>,
    ValidatedJson(dto): ValidatedJson<CheckoutDto>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetailDto>>)> {
    let order = service.checkout(user.id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(order),
            Some("Order placed successfully".to_string()),
            None,
        )),
    ))
}

/// List the current user's orders
#[utoipa::path(
    get,
    path = "/api/orders",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of orders", body = ApiResponse<Vec<OrderSummaryDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "orders",
    security(("bearer_auth" = []))
)]
pub async fn list_my_orders(
    user: AuthenticatedUser,
    State(service): State<Arc<OrderService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<OrderSummaryDto>>>> {
    let (orders, total) = service.list_for_user(user.id, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(orders),
        None,
        Some(Meta::paginated(total, &pagination)),
    )))
}

/// Get one of the current user's orders
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderDetailDto>),
        (status = 404, description = "Order not found")
    ),
    tag = "orders",
    security(("bearer_auth" = []))
)]
pub async fn get_my_order(
    user: AuthenticatedUser,
    State(service): State<Arc<OrderService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = service.get_for_user(user.id, id).await?;
    Ok(Json(ApiResponse::success(Some(order), None, None)))
}
