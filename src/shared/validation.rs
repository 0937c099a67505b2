use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating setting keys
    /// Must be lowercase snake_case starting with a letter
    /// - Valid: "site_title", "comment_moderation", "posts_per_page"
    /// - Invalid: "_site", "Site", "site-title", "site title"
    pub static ref SETTING_KEY_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}
