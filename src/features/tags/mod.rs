//! Flat post tags.
//!
//! Posts carry any number of tags through `post_tags`. Deleting a tag
//! drops its links; the posts stay.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/tags` | No | List tags (`?search=` by name) |
//! | GET | `/api/tags/popular` | No | Tags used by published posts, most used first |
//! | GET | `/api/tags/{slug}` | No | Get tag by slug |
//! | POST | `/api/admin/tags` | Editor | Create tag |
//! | PUT | `/api/admin/tags/{id}` | Editor | Update tag |
//! | DELETE | `/api/admin/tags/{id}` | Admin | Delete tag |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::TagService;
