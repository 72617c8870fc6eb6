//! HTTP middleware for axum.
//!
//! - `auth` - Optional shared-password gate

pub mod auth;

pub use auth::{basic_auth_middleware, AccessPassword};
