mod tag_service;

pub use tag_service::{check_tags, load_post_tags, replace_post_tags, TagService};
