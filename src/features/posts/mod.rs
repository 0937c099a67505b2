//! Blog posts, the content items that categories and comments hang off.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/posts` | No | List published posts (`?category=`, `?search=`) |
//! | GET | `/api/posts/{slug}` | No | Get a published post and count the view |
//! | POST | `/api/admin/posts` | Editor | Create post |
//! | PUT | `/api/admin/posts/{id}` | Editor | Update post |
//! | DELETE | `/api/admin/posts/{id}` | Admin | Delete post and its comments |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PostService;
