mod comment;

pub use comment::{Comment, CommentStats, CommentStatus, PendingComment};
