//! API layer for breathwork.
//!
//! This module exposes the breathing-session lifecycle over a JSON REST API.
//! Everything under `/profiles` and `/sessions` needs a bearer token and only
//! ever sees the caller's own records.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//!
//! ### Identity
//! - `POST /api/v1/auth/register` - Register a user, returns a token
//!
//! ### Profile
//! - `GET /api/v1/profiles/me` - Caller's profile and practice totals
//! - `PATCH /api/v1/profiles/me` - Edit bio and avatar
//!
//! ### Sessions
//! - `GET /api/v1/sessions` - List sessions, newest first
//! - `POST /api/v1/sessions` - Start a session
//! - `GET /api/v1/sessions/active` - Newest in-progress session
//! - `GET /api/v1/sessions/recent` - Newest sessions
//! - `GET /api/v1/sessions/stats` - Totals over completed sessions
//! - `GET /api/v1/sessions/{id}` - Session detail
//! - `PATCH /api/v1/sessions/{id}` - Edit configuration, notes, stats
//! - `POST /api/v1/sessions/{id}/{operation}` - `start_hold`, `end_hold`,
//!   `start_recovery`, `end_recovery`, `next_round`, `complete`, `cancel`
//!
//! ## Example
//!
//! ```no_run
//! use breathwork::api::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> breathwork::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve(config).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use handlers::{AppState, SessionDefaults};
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{
    CreateSessionRequest, ErrorResponse, ListSessionsResponse, ProfileResponse,
    RoundSampleRequest, SessionResponse, TokenResponse, UpdateSessionRequest,
};
