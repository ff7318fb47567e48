//! # quill-auth
//!
//! Client-side session and identity derivation for the Quill blogging
//! front-end. Decodes bearer tokens (payload only — the server is the real
//! authorization gate), normalizes the inconsistent role/id shapes the
//! backend emits, reconciles token claims against the fetched profile, and
//! owns the session lifecycle around a durable token store.

pub mod api;
pub mod claims;
pub mod decode;
pub mod error;
pub mod password;
pub mod resolver;
pub mod session;
pub mod token_store;

pub use claims::Claims;
pub use error::AuthError;
pub use session::{SessionController, SessionState};
pub use token_store::TokenStore;
