//! Site-wide key/value settings.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/settings` | No | Public settings as a key/value map |
//! | GET | `/api/admin/settings` | Admin | Every setting with description |
//! | PUT | `/api/admin/settings` | Admin | Upsert a key/value map |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SettingService;
