use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::home_settings::handlers;
use crate::features::home_settings::services::HomeSettingsService;

/// Back-office routes; every handler requires the admin role
pub fn admin_routes(service: Arc<HomeSettingsService>) -> Router {
    Router::new()
        .route(
            "/api/home-settings/page",
            get(handlers::get_page_settings).put(handlers::update_page_settings),
        )
        .route(
            "/api/home-settings/{section}",
            get(handlers::list_section).post(handlers::create_section_item),
        )
        .route(
            "/api/home-settings/{section}/{id}",
            get(handlers::get_section_item)
                .put(handlers::update_section_item)
                .delete(handlers::delete_section_item),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn service() -> Arc<HomeSettingsService> {
        Arc::new(HomeSettingsService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_customers_cannot_manage_home_content() {
        let server = TestServer::new(with_customer_auth(admin_routes(service()))).unwrap();

        server
            .get("/api/home-settings/carousel")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .put("/api/home-settings/page")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_section_is_rejected() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        server
            .get("/api/home-settings/popups")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_validates_section_form() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .post("/api/home-settings/sale")
            .json(&json!({
                "title": "",
                "background_color": "#12345"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
        assert!(errors.iter().any(|e| e.starts_with("title:")));
        assert!(errors
            .iter()
            .any(|e| e == "background_color: background_color must be #RGB or #RRGGBB"));
    }

    #[tokio::test]
    async fn test_update_rejects_reversed_window() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .put(&format!(
                "/api/home-settings/carousel/{}",
                uuid::Uuid::new_v4()
            ))
            .json(&json!({
                "title": "Autumn",
                "image_url": "https://cdn.example.com/autumn.jpg",
                "starts_at": "2026-10-01T00:00:00Z",
                "ends_at": "2026-09-01T00:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "body: ends_at must be after starts_at");
    }
}
