//! Bearer token authentication and role guards.
//!
//! Tokens are issued by the identity service and signed with a shared HS256
//! secret. This feature only validates them; it exposes no endpoints.

mod validator;

pub mod guards;
pub mod model;

pub use validator::JwtValidator;
