use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::cart::dtos::{AddCartItemDto, CartDto, UpdateCartItemDto};
use crate::features::cart::services::CartService;
use crate::shared::types::ApiResponse;

/// Get the current user's cart
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart with line totals", body = ApiResponse<CartDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "cart",
    security(("bearer_auth" = []))
)]
pub async fn get_cart(
    user: AuthenticatedUser,
    State(service): State<Arc<CartService>>,
) -> Result<Json<ApiResponse<CartDto>>> {
    let cart = service.get_cart(user.id).await?;
    Ok(Json(ApiResponse::success(Some(cart), None, None)))
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemDto,
    responses(
        (status = 200, description = "Updated cart", body = ApiResponse<CartDto>),
        (status = 400, description = "Validation error or not enough stock"),
        (status = 404, description = "Product not found")
    ),
    tag = "cart",
    security(("bearer_auth" = []))
)]
pub async fn add_cart_item(
    user: AuthenticatedUser,
    State(service): State<Arc<CartService>>,
    ValidatedJson(dto): ValidatedJson<AddCartItemDto>,
) -> Result<Json<ApiResponse<CartDto>>> {
    let cart = service.add_item(user.id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(cart),
        Some("Item added to cart".to_string()),
        None,
    )))
}

/// Change the quantity of a cart line
#[utoipa::path(
    put,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartItemDto,
    responses(
        (status = 200, description = "Updated cart", body = ApiResponse<CartDto>),
        (status = 400, description = "Validation error or not enough stock"),
        (status = 404, description = "Cart item not found")
    ),
    tag = "cart",
    security(("bearer_auth" = []))
)]
pub async fn update_cart_item(
    user: AuthenticatedUser,
    State(service): State<Arc<CartService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCartItemDto>,
) -> Result<Json<ApiResponse<CartDto>>> {
    let cart = service.update_item(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(cart), None, None)))
}

/// Remove a line from the cart
#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Updated cart", body = ApiResponse<CartDto>),
        (status = 404, description = "Cart item not found")
    ),
    tag = "cart",
    security(("bearer_auth" = []))
)]
pub async fn remove_cart_item(
    user: AuthenticatedUser,
    State(service): State<Arc<CartService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartDto>>> {
    let cart = service.remove_item(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        Some(cart),
        Some("Item removed from cart".to_string()),
        None,
    )))
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Empty cart", body = ApiResponse<CartDto>)
    ),
    tag = "cart",
    security(("bearer_auth" = []))
)]
pub async fn clear_cart(
    user: AuthenticatedUser,
    State(service): State<Arc<CartService>>,
) -> Result<Json<ApiResponse<CartDto>>> {
    let cart = service.clear(user.id).await?;
    Ok(Json(ApiResponse::success(
        Some(cart),
        Some("Cart cleared".to_string()),
        None,
    )))
}
