use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::products::dtos::{
    ProductDetailDto, ProductFormDto, ProductQueryParams, ProductSummaryDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List active products
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQueryParams),
    responses(
        (status = 200, description = "Paginated list of products", body = ApiResponse<Vec<ProductSummaryDto>>),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
    Query(params): Query<ProductQueryParams>,
) -> Result<Json<ApiResponse<Vec<ProductSummaryDto>>>> {
    let (products, total) = service.list_public(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta::paginated(total, &params.pagination())),
    )))
}

/// Get an active product by slug
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetailDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// List products of any status (admin)
#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(ProductQueryParams),
    responses(
        (status = 200, description = "Paginated list of products", body = ApiResponse<Vec<ProductSummaryDto>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "products",
    security(("bearer_auth" = []))
)]
pub async fn admin_list_products(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Query(params): Query<ProductQueryParams>,
) -> Result<Json<ApiResponse<Vec<ProductSummaryDto>>>> {
    let (products, total) = service.list_admin(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta::paginated(total, &params.pagination())),
    )))
}

/// Get a product by ID (admin)
#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetailDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products",
    security(("bearer_auth" = []))
)]
pub async fn admin_get_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Create a product with its images, colors, sizes and attributes (admin)
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductFormDto,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug or SKU already in use")
    ),
    tag = "products",
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    ValidatedJson(dto): ValidatedJson<ProductFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDetailDto>>)> {
    let product = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(product),
            Some("Product created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a product and its child collections (admin)
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductFormDto,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Slug or SKU already in use")
    ),
    tag = "products",
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ProductFormDto>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Product updated successfully".to_string()),
        None,
    )))
}

/// Delete a product (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<DeletedDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products",
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id }),
        Some("Product deleted successfully".to_string()),
        None,
    )))
}
