/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Comment listings default to a larger page, matching the public renderer
pub const DEFAULT_COMMENT_PAGE_SIZE: i64 = 20;

/// Tag listings are small rows, so a page holds more of them
pub const DEFAULT_TAG_PAGE_SIZE: i64 = 50;

/// Default size of the popular tags list
pub const DEFAULT_POPULAR_TAGS: i64 = 20;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Full control, including deletions and site settings
pub const ROLE_ADMIN: &str = "admin";

/// Can manage posts, categories and moderate comments
pub const ROLE_EDITOR: &str = "editor";

// =============================================================================
// SETTINGS
// =============================================================================

/// When "1", new comments start as pending
pub const SETTING_COMMENT_MODERATION: &str = "comment_moderation";

/// Settings exposed to anonymous visitors
pub const PUBLIC_SETTING_KEYS: &[&str] = &[
    "site_title",
    "site_description",
    "site_keywords",
    "posts_per_page",
    "site_logo",
];
