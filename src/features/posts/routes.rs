use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::posts::handlers;
use crate::features::posts::services::PostService;

/// Public read routes for posts
pub fn routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts/{slug}", get(handlers::get_post))
        .with_state(service)
}

/// Admin routes for post management
pub fn admin_routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route("/api/admin/posts", post(handlers::create_post))
        .route(
            "/api/admin/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .with_state(service)
}
