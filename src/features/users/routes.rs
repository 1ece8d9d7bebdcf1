use crate::features::users::handlers::profile_handler;
use crate::features::users::services::UserProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route(
            "/api/auth/profile",
            get(profile_handler::get_profile).put(profile_handler::update_profile),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn service() -> Arc<UserProfileService> {
        Arc::new(UserProfileService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let server = TestServer::new(routes(service())).unwrap();
        server
            .get("/api/auth/profile")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_rejects_long_phone() {
        let server = TestServer::new(with_customer_auth(routes(service()))).unwrap();

        let response = server
            .put("/api/auth/profile")
            .json(&json!({ "name": "Dana", "phone": "0".repeat(31) }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "phone: Phone must not exceed 30 characters");
    }
}
