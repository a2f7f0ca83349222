//! Bearer token authentication.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::account::UserId;
use crate::api::ErrorResponse;

/// Token configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Prefix for the token in the Authorization header (default: "Bearer ").
    pub prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            prefix: "Bearer ".to_string(),
        }
    }
}

/// Thread-safe map from issued tokens to the user they identify.
#[derive(Debug)]
pub struct TokenStore {
    tokens: RwLock<HashMap<String, UserId>>,
    config: AuthConfig,
}

impl TokenStore {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Issue a fresh token for `user`.
    pub fn issue(&self, user: UserId) -> Option<String> {
        let token = generate_token();
        self.tokens.write().ok()?.insert(token.clone(), user);
        Some(token)
    }

    /// The user a token identifies, if any.
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.get(token).copied())
    }

    /// Get the number of issued tokens.
    pub fn count(&self) -> usize {
        self.tokens.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Extract the token from an authorization header value.
    pub fn extract_token<'a>(&self, header_value: &'a str) -> Option<&'a str> {
        header_value
            .strip_prefix(self.config.prefix.as_str())
            .filter(|token| !token.is_empty())
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(AuthConfig::default())
    }
}

/// Authentication middleware for axum.
///
/// Resolves the bearer token to a [`UserId`] and stores it in the request
/// extensions for handlers to pick up.
pub async fn auth_middleware(
    State(store): State<Arc<TokenStore>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| store.extract_token(header))
        .and_then(|token| store.resolve(token));

    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized()),
        )
            .into_response(),
    }
}

/// Generate an opaque bearer token from a random (v4) UUID.
pub fn generate_token() -> String {
    format!("bw_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert_eq!(config.prefix, "Bearer ");
    }

    #[test]
    fn test_issue_and_resolve() {
        let store = TokenStore::default();
        let user = UserId::from_raw(5);

        let token = store.issue(user).unwrap();
        assert_eq!(store.resolve(&token), Some(user));
        assert_eq!(store.resolve("unknown"), None);
        assert_eq!(store.count(), 1);

        let second = store.issue(user).unwrap();
        assert_ne!(token, second);
        assert_eq!(store.resolve(&second), Some(user));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_extract_token() {
        let store = TokenStore::default();
        assert_eq!(store.extract_token("Bearer abc123"), Some("abc123"));
        assert_eq!(store.extract_token("Bearer "), None);
        assert_eq!(store.extract_token("Basic credentials"), None);
    }

    #[test]
    fn test_generate_token_unique() {
        let tokens: std::collections::HashSet<String> =
            (0..1000).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 1000);
        assert!(tokens.iter().all(|t| t.starts_with("bw_") && t.len() == 35));
    }
}
