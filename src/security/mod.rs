//! Security module for breathwork.
//!
//! Requests to owner-scoped endpoints carry a bearer token; the middleware
//! here resolves it to the owning user before any handler runs.
//!
//! ## Example
//!
//! ```rust
//! use breathwork::account::UserId;
//! use breathwork::security::TokenStore;
//!
//! let tokens = TokenStore::default();
//! let token = tokens.issue(UserId::from_raw(1)).unwrap();
//! assert_eq!(tokens.resolve(&token), Some(UserId::from_raw(1)));
//! ```

pub mod auth;

pub use auth::{auth_middleware, generate_token, AuthConfig, TokenStore};
