//! AuthProvider trait definition and token claim types

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the identity provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity provider handshake failed: {0}")]
    Handshake(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Credentials for the direct (headless) login flow
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Realm role claims embedded in the access token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Access token claims the client cares about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    /// Expiry as unix seconds
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: RealmAccess,
}

impl TokenClaims {
    /// Remaining lifetime relative to `now` (unix seconds), zero if expired
    pub fn remaining_validity(&self, now: u64) -> Duration {
        Duration::from_secs(self.exp.saturating_sub(now))
    }
}

/// ID token claims (profile data for display)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

/// Trait for identity-provider clients (Keycloak or a test double)
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Silent session restore. Returns whether an existing session was resumed.
    async fn init(&self) -> Result<bool, AuthError>;

    /// Ensure the access token stays valid for at least `min_validity`,
    /// refreshing through the provider if needed. Returns whether the token
    /// was actually refreshed. Concurrent calls coalesce: callers that lose
    /// the race observe the token the winner fetched.
    async fn update_token(&self, min_validity: Duration) -> Result<bool, AuthError>;

    /// Direct-grant login with user credentials
    async fn login(&self, credentials: &Credentials) -> Result<(), AuthError>;

    /// End the provider session and drop all stored tokens
    async fn logout(&self) -> Result<(), AuthError>;

    /// Browser URL for the provider's interactive login flow
    fn login_url(&self, redirect_uri: &str) -> String;

    /// Browser URL for the provider's registration flow
    fn register_url(&self, redirect_uri: &str) -> String;

    /// Current raw access token, if any
    async fn token(&self) -> Option<String>;

    /// Parsed access token claims, if any
    async fn token_claims(&self) -> Option<TokenClaims>;

    /// Parsed ID token claims, if any
    async fn id_token_claims(&self) -> Option<IdTokenClaims>;

    /// Check a single realm role against the current access token
    async fn has_realm_role(&self, role: &str) -> bool {
        self.token_claims()
            .await
            .map(|claims| claims.realm_access.roles.iter().any(|r| r == role))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_validity() {
        let claims = TokenClaims {
            exp: 1_000,
            ..Default::default()
        };
        assert_eq!(claims.remaining_validity(940), Duration::from_secs(60));
        assert_eq!(claims.remaining_validity(1_000), Duration::ZERO);
        assert_eq!(claims.remaining_validity(2_000), Duration::ZERO);
    }
}
