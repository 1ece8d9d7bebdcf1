use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::home::dtos::HomePageDto;
use crate::features::home::services::HomeService;
use crate::shared::types::ApiResponse;

/// Storefront home page: every enabled section with its published content
#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Home page content", body = ApiResponse<HomePageDto>)
    ),
    tag = "home"
)]
pub async fn get_home_page(
    State(service): State<Arc<HomeService>>,
) -> Result<Json<ApiResponse<HomePageDto>>> {
    let page = service.page().await?;
    Ok(Json(ApiResponse::success(Some(page), None, None)))
}
