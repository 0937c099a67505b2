use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Anything that is not ASCII word, CJK ideograph, whitespace or hyphen
    static ref DISALLOWED: Regex =
        Regex::new(r"[^a-z0-9_\x{4e00}-\x{9fa5}\s-]").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[\s_-]+").unwrap();
}

/// Builds a URL slug from a display name.
///
/// Lowercases, drops punctuation, joins words with single hyphens and trims
/// hyphens at both ends. CJK ideographs are kept as-is.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&cleaned, "-");
    joined.trim_matches('-').to_string()
}

/// [`slugify`], rejecting names that leave nothing usable.
pub fn slug_for(name: &str) -> Result<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation(format!(
            "'{}' does not contain any characters usable in a slug",
            name
        )));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust   Tips  "), "rust-tips");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("What's new? (2024)"), "whats-new-2024");
        assert_eq!(slugify("--Leading & trailing--"), "leading-trailing");
        assert_eq!(slugify("a - b -- c"), "a-b-c");
    }

    #[test]
    fn test_slugify_keeps_cjk() {
        assert_eq!(slugify("技术 笔记"), "技术-笔记");
        assert_eq!(slugify("Rust 入门!"), "rust-入门");
    }

    #[test]
    fn test_slug_for_rejects_empty() {
        assert!(matches!(slug_for("!!!"), Err(AppError::Validation(_))));
        assert_eq!(slug_for("News").unwrap(), "news");
    }
}
