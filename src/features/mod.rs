pub mod auth;
pub mod categories;
pub mod comments;
pub mod posts;
pub mod settings;
pub mod tags;
