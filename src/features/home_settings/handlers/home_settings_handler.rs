use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, ValidatedJson};
use crate::features::auth::guards::RequireAdmin;
use crate::features::home_settings::dtos::{
    HomeContent, HomeContentForm, HomePageSettingsForm, HomeSection,
};
use crate::features::home_settings::models::HomePageSettings;
use crate::features::home_settings::services::HomeSettingsService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List every entry of a home-page section, including inactive ones
#[utoipa::path(
    get,
    path = "/api/home-settings/{section}",
    params(("section" = HomeSection, Path, description = "Content section")),
    responses(
        (status = 200, description = "Section entries", body = ApiResponse<Vec<HomeContent>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn list_section(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
    Path(section): Path<HomeSection>,
) -> Result<Json<ApiResponse<Vec<HomeContent>>>> {
    let items = service.list(section).await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/home-settings/{section}/{id}",
    params(
        ("section" = HomeSection, Path, description = "Content section"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = ApiResponse<HomeContent>),
        (status = 404, description = "Entry not found")
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn get_section_item(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
    Path((section, id)): Path<(HomeSection, Uuid)>,
) -> Result<Json<ApiResponse<HomeContent>>> {
    let item = service.get(section, id).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

/// Create an entry; the body shape depends on the section
#[utoipa::path(
    post,
    path = "/api/home-settings/{section}",
    params(("section" = HomeSection, Path, description = "Content section")),
    request_body(content = serde_json::Value, description = "Section form, e.g. CarouselBannerForm"),
    responses(
        (status = 201, description = "Entry created", body = ApiResponse<HomeContent>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Referenced product or category not found")
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn create_section_item(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
    Path(section): Path<HomeSection>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<(StatusCode, Json<ApiResponse<HomeContent>>)> {
    let form = HomeContentForm::parse(section, body)?;
    let item = service.create(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(item),
            Some("Created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/home-settings/{section}/{id}",
    params(
        ("section" = HomeSection, Path, description = "Content section"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    request_body(content = serde_json::Value, description = "Section form, e.g. CarouselBannerForm"),
    responses(
        (status = 200, description = "Entry updated", body = ApiResponse<HomeContent>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Entry not found")
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn update_section_item(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
    Path((section, id)): Path<(HomeSection, Uuid)>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<ApiResponse<HomeContent>>> {
    let form = HomeContentForm::parse(section, body)?;
    let item = service.update(id, form).await?;
    Ok(Json(ApiResponse::success(
        Some(item),
        Some("Updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/home-settings/{section}/{id}",
    params(
        ("section" = HomeSection, Path, description = "Content section"),
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = ApiResponse<DeletedDto>),
        (status = 404, description = "Entry not found")
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn delete_section_item(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
    Path((section, id)): Path<(HomeSection, Uuid)>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(section, id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id }),
        Some("Deleted successfully".to_string()),
        None,
    )))
}

/// Get the home-page section toggles
#[utoipa::path(
    get,
    path = "/api/home-settings/page",
    responses(
        (status = 200, description = "Home page settings", body = ApiResponse<HomePageSettings>)
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn get_page_settings(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
) -> Result<Json<ApiResponse<HomePageSettings>>> {
    let settings = service.page_settings().await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/home-settings/page",
    request_body = HomePageSettingsForm,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<HomePageSettings>),
        (status = 400, description = "Validation error")
    ),
    tag = "home-settings",
    security(("bearer_auth" = []))
)]
pub async fn update_page_settings(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<HomeSettingsService>>,
    ValidatedJson(form): ValidatedJson<HomePageSettingsForm>,
) -> Result<Json<ApiResponse<HomePageSettings>>> {
    let settings = service.update_page_settings(form).await?;
    Ok(Json(ApiResponse::success(
        Some(settings),
        Some("Home page settings updated".to_string()),
        None,
    )))
}
