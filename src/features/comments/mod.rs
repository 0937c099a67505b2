//! Threaded comments on posts.
//!
//! Replies form a tree per post. Deleting a comment removes its whole reply
//! subtree. `posts.comment_count` is recomputed from approved rows whenever
//! a comment is added, moderated or deleted.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/comments/post/{post_id}` | Optional | Comment tree for a post |
//! | POST | `/api/comments` | No | Submit a comment or reply |
//! | GET | `/api/admin/comments/pending` | Editor | Moderation queue |
//! | GET | `/api/admin/comments/stats` | Editor | Counts per status |
//! | PUT | `/api/admin/comments/{id}/status` | Editor | Change status |
//! | DELETE | `/api/admin/comments/{id}` | Admin | Delete comment and replies |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
mod store;

pub use services::CommentService;
