use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::settings::handlers;
use crate::features::settings::services::SettingService;

/// Public settings route
pub fn routes(service: Arc<SettingService>) -> Router {
    Router::new()
        .route("/api/settings", get(handlers::get_public_settings))
        .with_state(service)
}

/// Admin routes for settings (admin only)
pub fn admin_routes(service: Arc<SettingService>) -> Router {
    Router::new()
        .route(
            "/api/admin/settings",
            get(handlers::list_settings).put(handlers::update_settings),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::core::middleware::auth_middleware;
    use crate::shared::test_helpers::{bearer_for, lazy_pool, test_validator, with_admin_auth};

    fn service() -> Arc<SettingService> {
        Arc::new(SettingService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_editor_cannot_read_admin_settings() {
        let app = admin_routes(service()).route_layer(axum::middleware::from_fn_with_state(
            Arc::new(test_validator()),
            auth_middleware,
        ));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/admin/settings")
            .add_header(header::AUTHORIZATION, bearer_for(&["editor"]))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .put("/api/admin/settings")
            .json(&json!({"settings": {"Site Title": "x"}}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("Site Title"));
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .put("/api/admin/settings")
            .json(&json!({"settings": ["not", "a", "map"]}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
