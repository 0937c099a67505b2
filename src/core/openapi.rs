use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::comments::{
    dtos as comments_dtos, handlers as comments_handlers, models as comments_models,
};
use crate::features::posts::{dtos as posts_dtos, handlers as posts_handlers, models as posts_models};
use crate::features::settings::{dtos as settings_dtos, handlers as settings_handlers};
use crate::features::tags::{dtos as tags_dtos, handlers as tags_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Posts
        posts_handlers::list_posts,
        posts_handlers::get_post,
        posts_handlers::create_post,
        posts_handlers::update_post,
        posts_handlers::delete_post,
        // Tags
        tags_handlers::list_tags,
        tags_handlers::popular_tags,
        tags_handlers::get_tag,
        tags_handlers::create_tag,
        tags_handlers::update_tag,
        tags_handlers::delete_tag,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::list_pending_comments,
        comments_handlers::comment_stats,
        comments_handlers::update_comment_status,
        comments_handlers::delete_comment,
        // Settings
        settings_handlers::get_public_settings,
        settings_handlers::list_settings,
        settings_handlers::update_settings,
    ),
    components(
        schemas(
            Meta,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryListDto,
            categories_dtos::DeleteCategoryResponseDto,
            ApiResponse<categories_dtos::CategoryListDto>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<categories_dtos::DeleteCategoryResponseDto>,
            // Posts
            posts_models::PostStatus,
            posts_dtos::CreatePostDto,
            posts_dtos::UpdatePostDto,
            posts_dtos::PostResponseDto,
            posts_dtos::PostSummaryDto,
            ApiResponse<posts_dtos::PostResponseDto>,
            ApiResponse<Vec<posts_dtos::PostSummaryDto>>,
            // Tags
            tags_dtos::CreateTagDto,
            tags_dtos::UpdateTagDto,
            tags_dtos::TagResponseDto,
            tags_dtos::TagSummaryDto,
            ApiResponse<tags_dtos::TagResponseDto>,
            ApiResponse<Vec<tags_dtos::TagResponseDto>>,
            // Comments
            comments_models::CommentStatus,
            comments_dtos::CreateCommentDto,
            comments_dtos::UpdateCommentStatusDto,
            comments_dtos::CommentResponseDto,
            comments_dtos::CommentTreeDto,
            comments_dtos::PendingCommentDto,
            comments_dtos::CommentStatsDto,
            comments_dtos::DeleteCommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentTreeDto>>,
            ApiResponse<Vec<comments_dtos::PendingCommentDto>>,
            ApiResponse<comments_dtos::CommentStatsDto>,
            ApiResponse<comments_dtos::DeleteCommentResponseDto>,
            // Settings
            settings_dtos::PublicSettingsDto,
            settings_dtos::SettingResponseDto,
            settings_dtos::UpdateSettingsDto,
            ApiResponse<settings_dtos::PublicSettingsDto>,
            ApiResponse<Vec<settings_dtos::SettingResponseDto>>,
        )
    ),
    tags(
        (name = "categories", description = "Category tree"),
        (name = "posts", description = "Blog posts"),
        (name = "tags", description = "Post tags"),
        (name = "comments", description = "Threaded comments and moderation"),
        (name = "settings", description = "Site settings"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Blog API",
        version = "0.1.0",
        description = "API documentation for the blog backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
