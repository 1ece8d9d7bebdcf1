use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::orders::dtos::{
    AddOrderItemDto, OrderDetailDto, OrderQueryParams, OrderSummaryDto, ShippingAddressDto,
    UpdateOrderStatusDto,
};
use crate::features::orders::services::OrderService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List all orders (admin)
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(OrderQueryParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ApiResponse<Vec<OrderSummaryDto>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn admin_list_orders(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Query(params): Query<OrderQueryParams>,
) -> Result<Json<ApiResponse<Vec<OrderSummaryDto>>>> {
    let (orders, total) = service.list_admin(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(orders),
        None,
        Some(Meta::paginated(total, &params.pagination())),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderDetailDto>),
        (status = 404, description = "Order not found")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn admin_get_order(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(order), None, None)))
}

/// Move an order through its lifecycle
#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderDetailDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateOrderStatusDto>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = service.update_status(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(order),
        Some("Order status updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/address",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ShippingAddressDto,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<OrderDetailDto>),
        (status = 400, description = "Validation error or order no longer editable"),
        (status = 404, description = "Order not found")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn update_order_address(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ShippingAddressDto>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = service.update_address(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(order),
        Some("Shipping address updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = AddOrderItemDto,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<OrderDetailDto>),
        (status = 400, description = "Validation error, not enough stock or order no longer editable"),
        (status = 404, description = "Order or product not found")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn add_order_item(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AddOrderItemDto>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = service.add_item(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(order),
        Some("Item added to order".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<OrderDetailDto>),
        (status = 400, description = "Last item or order no longer editable"),
        (status = 404, description = "Order or item not found")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn remove_order_item(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = service.remove_item(id, item_id).await?;
    Ok(Json(ApiResponse::success(
        Some(order),
        Some("Item removed from order".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted", body = ApiResponse<DeletedDto>),
        (status = 404, description = "Order not found")
    ),
    tag = "admin-orders",
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<OrderService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id }),
        Some("Order deleted".to_string()),
        None,
    )))
}
