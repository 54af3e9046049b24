//! Keycloak implementation of `AuthProvider`
//!
//! Talks to the realm's OpenID Connect endpoints over HTTP: refresh-token
//! grant for silent restore and token refresh, resource-owner password grant
//! for headless login, refresh-token revocation for logout. Interactive
//! flows (login/registration in a browser) are delegated by handing the
//! caller the provider URL to open.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::provider::{
    AuthError, AuthProvider, Credentials, IdTokenClaims, TokenClaims,
};
use crate::config::KeycloakConfig;

/// Current unix time in seconds
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

/// Error body returned by Keycloak endpoints
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorResponse {
    fn message(self, status: StatusCode) -> String {
        self.error_description
            .or(self.error)
            .unwrap_or_else(|| format!("provider returned status {}", status))
    }
}

/// Tokens and parsed claims held between refreshes
#[derive(Default)]
struct TokenStore {
    access_token: Option<String>,
    refresh_token: Option<String>,
    access_claims: Option<TokenClaims>,
    id_claims: Option<IdTokenClaims>,
}

impl TokenStore {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Keycloak client for one realm.
///
/// The token store sits behind a single mutex, which doubles as the refresh
/// de-duplication point: concurrent `update_token` calls serialize, and a
/// caller that loses the race finds the token already fresh under the lock
/// and returns without a second network round trip.
pub struct KeycloakProvider {
    http: reqwest::Client,
    config: KeycloakConfig,
    store: Mutex<TokenStore>,
}

impl KeycloakProvider {
    pub fn new(config: KeycloakConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            store: Mutex::new(TokenStore::default()),
        }
    }

    /// Seed the provider with a stored refresh token so `init` can restore
    /// the session silently (the headless equivalent of check-sso).
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.store.get_mut().refresh_token = Some(refresh_token.into());
        self
    }

    fn realm_endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/{}",
            self.config.base_url, self.config.realm, suffix
        )
    }

    fn flow_url(&self, endpoint: &str, redirect_uri: &str) -> String {
        let mut url = match Url::parse(&self.realm_endpoint(endpoint)) {
            Ok(url) => url,
            // Misconfigured base URL; return the raw endpoint rather than panic
            Err(e) => {
                warn!("Invalid provider base URL: {}", e);
                return self.realm_endpoint(endpoint);
            }
        };
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid");
        url.to_string()
    }

    /// Run a grant against the token endpoint and store the result
    async fn token_grant(
        &self,
        store: &mut TokenStore,
        params: &[(&str, &str)],
    ) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.realm_endpoint("token"))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.message(status))
                .unwrap_or_else(|_| format!("provider returned status {}", status));
            return Err(AuthError::Refresh(message));
        }

        let tokens: TokenResponse = response.json().await?;
        let access_claims: TokenClaims = decode_claims(&tokens.access_token)?;
        let id_claims = match &tokens.id_token {
            Some(id_token) => Some(decode_claims::<IdTokenClaims>(id_token)?),
            None => None,
        };

        debug!(
            exp = access_claims.exp,
            subject = %access_claims.sub,
            "Stored fresh token set from provider"
        );

        store.access_token = Some(tokens.access_token);
        // Keycloak rotates refresh tokens; keep the old one only if none came back
        if tokens.refresh_token.is_some() {
            store.refresh_token = tokens.refresh_token;
        }
        store.access_claims = Some(access_claims);
        if id_claims.is_some() {
            store.id_claims = id_claims;
        }

        Ok(())
    }

    async fn refresh_grant(&self, store: &mut TokenStore) -> Result<(), AuthError> {
        let refresh_token = store
            .refresh_token
            .clone()
            .ok_or(AuthError::NotAuthenticated)?;
        self.token_grant(
            store,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.config.client_id),
                ("refresh_token", &refresh_token),
            ],
        )
        .await
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
/// The backend verifies tokens; the client only reads claims for display
/// and role derivation, exactly like a browser SPA would.
fn decode_claims<T: DeserializeOwned>(jwt: &str) -> Result<T, AuthError> {
    let payload = jwt
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::MalformedToken("missing payload segment".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not valid JSON: {}", e)))
}

#[async_trait]
impl AuthProvider for KeycloakProvider {
    async fn init(&self) -> Result<bool, AuthError> {
        let mut store = self.store.lock().await;

        // Nothing stored to restore from: unauthenticated, not an error
        if store.refresh_token.is_none() {
            return Ok(false);
        }

        match self.refresh_grant(&mut store).await {
            Ok(()) => Ok(true),
            Err(e) => {
                store.clear();
                Err(AuthError::Handshake(e.to_string()))
            }
        }
    }

    async fn update_token(&self, min_validity: Duration) -> Result<bool, AuthError> {
        let mut store = self.store.lock().await;

        let claims = store
            .access_claims
            .as_ref()
            .ok_or(AuthError::NotAuthenticated)?;

        // Re-check under the lock: a concurrent caller may have refreshed already
        if claims.remaining_validity(now_secs()) > min_validity {
            return Ok(false);
        }

        match self.refresh_grant(&mut store).await {
            Ok(()) => Ok(true),
            Err(e) => {
                // A failed refresh leaves only dead tokens behind
                store.clear();
                Err(e)
            }
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let mut store = self.store.lock().await;
        self.token_grant(
            &mut store,
            &[
                ("grant_type", "password"),
                ("client_id", &self.config.client_id),
                ("username", &credentials.username),
                ("password", &credentials.password),
                ("scope", "openid"),
            ],
        )
        .await
        .map_err(|e| match e {
            AuthError::Refresh(message) => AuthError::LoginRejected(message),
            other => other,
        })
    }

    async fn logout(&self) -> Result<(), AuthError> {
        // Drop local tokens first so the session is gone even if revocation fails
        let refresh_token = {
            let mut store = self.store.lock().await;
            let token = store.refresh_token.take();
            store.clear();
            token
        };

        if let Some(refresh_token) = refresh_token {
            self.http
                .post(self.realm_endpoint("logout"))
                .form(&[
                    ("client_id", self.config.client_id.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                ])
                .send()
                .await?
                .error_for_status()
                .map_err(AuthError::Transport)?;
        }

        Ok(())
    }

    fn login_url(&self, redirect_uri: &str) -> String {
        self.flow_url("auth", redirect_uri)
    }

    fn register_url(&self, redirect_uri: &str) -> String {
        self.flow_url("registrations", redirect_uri)
    }

    async fn token(&self) -> Option<String> {
        self.store.lock().await.access_token.clone()
    }

    async fn token_claims(&self) -> Option<TokenClaims> {
        self.store.lock().await.access_claims.clone()
    }

    async fn id_token_claims(&self) -> Option<IdTokenClaims> {
        self.store.lock().await.id_claims.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::parse_realm_roles;

    /// Build an unsigned JWT with the given JSON payload
    fn fake_jwt(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{}.{}.", header, body)
    }

    #[test]
    fn test_decode_access_claims() {
        let jwt = fake_jwt(serde_json::json!({
            "exp": 1_700_000_000u64,
            "sub": "user-1",
            "preferred_username": "alice",
            "realm_access": { "roles": ["Orchard-3-Admin", "offline_access"] }
        }));

        let claims: TokenClaims = decode_claims(&jwt).unwrap();
        assert_eq!(claims.exp, 1_700_000_000);
        assert_eq!(claims.preferred_username.as_deref(), Some("alice"));

        let roles = parse_realm_roles(&claims.realm_access.roles);
        assert!(roles.is_orchard_admin(3));
    }

    #[test]
    fn test_decode_claims_tolerates_missing_fields() {
        let jwt = fake_jwt(serde_json::json!({ "exp": 12u64 }));
        let claims: TokenClaims = decode_claims(&jwt).unwrap();
        assert_eq!(claims.exp, 12);
        assert!(claims.realm_access.roles.is_empty());
    }

    #[test]
    fn test_decode_claims_rejects_garbage() {
        assert!(matches!(
            decode_claims::<TokenClaims>("not-a-jwt"),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(
            decode_claims::<TokenClaims>("a.$$$.c"),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_flow_urls() {
        let provider = KeycloakProvider::new(KeycloakConfig {
            base_url: "http://localhost:8080".to_string(),
            realm: "OrchardRealm".to_string(),
            client_id: "orchard-client".to_string(),
        });

        let url = provider.register_url("http://localhost:5173/");
        assert!(url.starts_with(
            "http://localhost:8080/realms/OrchardRealm/protocol/openid-connect/registrations?"
        ));
        assert!(url.contains("client_id=orchard-client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5173%2F"));

        let url = provider.login_url("http://localhost:5173/");
        assert!(url.contains("/protocol/openid-connect/auth?"));
        assert!(url.contains("response_type=code"));
    }
}
