//! # quill-core
//!
//! Shared session/identity types for the Quill blogging client:
//! - Canonical `Role` enum with privilege precedence
//! - `Identity`, the resolved in-memory record of the signed-in user
//! - Numeric-id coercion and ownership checks for comments and posts

pub mod identity;
pub mod ownership;
pub mod role;

pub use identity::{Identity, UserId};
pub use role::Role;
