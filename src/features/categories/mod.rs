//! Category tree for posts.
//!
//! Categories nest arbitrarily deep. A category that still has
//! subcategories cannot be deleted; posts filed under a deleted category
//! become uncategorized.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Category tree (`?flat=true` for a list) |
//! | GET | `/api/categories/{slug}` | No | Get category by slug |
//! | POST | `/api/admin/categories` | Editor | Create category |
//! | PUT | `/api/admin/categories/{id}` | Editor | Update or move category |
//! | DELETE | `/api/admin/categories/{id}` | Admin | Delete a childless category |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
mod store;

pub use services::CategoryService;
