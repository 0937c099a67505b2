mod setting_service;

pub use setting_service::{comment_moderation_enabled, SettingService};
