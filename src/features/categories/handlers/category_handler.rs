use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::categories::dtos::{
    CategoryFormDto, CategoryResponseDto, CategoryTreeDto, ParentOptionDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// Query params for listing categories
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

/// List all active categories
///
/// Returns categories as flat list or tree structure based on `tree` query param.
#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("tree" = Option<bool>, Query, description = "Return tree structure if true")
    ),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let (value, total) = if query.tree {
        let tree: Vec<CategoryTreeDto> = service.list_tree().await?;
        let total = tree.len() as i64;
        (serde_json::to_value(tree), total)
    } else {
        let categories = service.list().await?;
        let total = categories.len() as i64;
        (serde_json::to_value(categories), total)
    };

    let value = value.map_err(|e| AppError::Internal(format!("Serialize categories: {}", e)))?;
    Ok(Json(ApiResponse::success(
        Some(value),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get category by slug
#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// List all categories including inactive ones (admin)
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn admin_list_categories(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list_all().await?;
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get category by ID (admin)
#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn admin_get_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Categories selectable as parent of the given category
///
/// Excludes the category itself and all of its descendants.
#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}/parent-options",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Selectable parents", body = ApiResponse<Vec<ParentOptionDto>>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn admin_parent_options(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ParentOptionDto>>>> {
    let options = service.parent_options(id).await?;
    Ok(Json(ApiResponse::success(Some(options), None, None)))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryFormDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    ValidatedJson(dto): ValidatedJson<CategoryFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a category (admin)
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryFormDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error or parent cycle"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CategoryFormDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated successfully".to_string()),
        None,
    )))
}

/// Delete a category (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeletedDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id }),
        Some("Category deleted successfully".to_string()),
        None,
    )))
}
