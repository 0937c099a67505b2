use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::core::middleware::optional_auth_middleware;
use crate::features::auth::JwtValidator;
use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Public comment routes. Listing recognises staff through an optional
/// bearer token.
pub fn routes(service: Arc<CommentService>, validator: Arc<JwtValidator>) -> Router {
    Router::new()
        .route(
            "/api/comments/post/{post_id}",
            get(handlers::list_comments),
        )
        .route_layer(middleware::from_fn_with_state(
            validator,
            optional_auth_middleware,
        ))
        .route("/api/comments", post(handlers::create_comment))
        .with_state(service)
}

/// Admin routes for comment moderation
pub fn admin_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/admin/comments/pending",
            get(handlers::list_pending_comments),
        )
        .route("/api/admin/comments/stats", get(handlers::comment_stats))
        .route(
            "/api/admin/comments/{id}/status",
            put(handlers::update_comment_status),
        )
        .route("/api/admin/comments/{id}", delete(handlers::delete_comment))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use fake::faker::internet::en::Username;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use serde_json::json;

    use crate::core::middleware::auth_middleware;
    use crate::shared::test_helpers::{bearer_for, lazy_pool, test_validator, with_admin_auth};

    fn service() -> Arc<CommentService> {
        Arc::new(CommentService::new(lazy_pool()))
    }

    fn public_server() -> TestServer {
        TestServer::new(routes(service(), Arc::new(test_validator()))).unwrap()
    }

    fn admin_server() -> TestServer {
        let app = admin_routes(service()).route_layer(middleware::from_fn_with_state(
            Arc::new(test_validator()),
            auth_middleware,
        ));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_listing_rejects_bad_token() {
        let response = public_server()
            .get("/api/comments/post/1")
            .add_header(
                header::AUTHORIZATION,
                header::HeaderValue::from_static("Bearer expired.or.forged"),
            )
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let author: String = Username().fake();
        let content: String = Sentence(3..6).fake();

        let response = public_server()
            .post("/api/comments")
            .json(&json!({
                "post_id": 1,
                "author_name": author,
                "author_email": "nobody-at-example",
                "content": content,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let author: String = Username().fake();

        let response = public_server()
            .post("/api/comments")
            .json(&json!({
                "post_id": 1,
                "author_name": author,
                "author_email": "reader@example.com",
                "content": "",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_moderation_requires_token() {
        let response = admin_server().get("/api/admin/comments/pending").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_author_cannot_moderate() {
        let response = admin_server()
            .put("/api/admin/comments/4/status")
            .add_header(header::AUTHORIZATION, bearer_for(&["author"]))
            .json(&json!({"status": "approved"}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_editor_cannot_delete() {
        let response = admin_server()
            .delete("/api/admin/comments/4")
            .add_header(header::AUTHORIZATION, bearer_for(&["editor"]))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_status_rejected() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .put("/api/admin/comments/4/status")
            .json(&json!({"status": "published"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
