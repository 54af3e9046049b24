//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules: a scriptable
//! identity-provider double and an in-process API fixture server.

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, extract::Path};
use orchard_client::auth::{
    AuthError, AuthProvider, Credentials, IdTokenClaims, RealmAccess, TokenClaims,
};
use serde_json::json;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// ============================================================================
// Mock identity provider
// ============================================================================

#[derive(Default)]
struct MockState {
    has_session: bool,
    fail_init: bool,
    fail_refresh: bool,
    token: Option<String>,
    claims: Option<TokenClaims>,
    id_claims: Option<IdTokenClaims>,
    refresh_calls: u32,
    /// Roles the next successful refresh swaps in (simulates a role change
    /// landing with a rotated token)
    roles_after_refresh: Option<Vec<String>>,
}

/// Scriptable `AuthProvider` double
pub struct MockAuthProvider {
    state: Mutex<MockState>,
}

impl MockAuthProvider {
    /// Provider with no restorable session
    pub fn unauthenticated() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Provider holding a session with the given realm roles, expiring
    /// `expires_in` seconds from now
    pub fn authenticated(roles: &[&str], expires_in: u64) -> Self {
        let claims = TokenClaims {
            exp: now_secs() + expires_in,
            sub: "user-1".to_string(),
            preferred_username: Some("alice".to_string()),
            realm_access: RealmAccess {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        };
        Self {
            state: Mutex::new(MockState {
                has_session: true,
                token: Some("token-0".to_string()),
                claims: Some(claims),
                id_claims: Some(IdTokenClaims {
                    sub: "user-1".to_string(),
                    preferred_username: Some("alice".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        }
    }

    /// Make every refresh attempt fail (expired provider session)
    pub fn failing_refresh(self) -> Self {
        self.state.lock().unwrap().fail_refresh = true;
        self
    }

    /// Make the initial handshake fail outright
    pub fn failing_init(self) -> Self {
        self.state.lock().unwrap().fail_init = true;
        self
    }

    /// Swap in these roles with the next rotated token
    pub fn rotate_roles_on_refresh(self, roles: &[&str]) -> Self {
        self.state.lock().unwrap().roles_after_refresh =
            Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Number of refreshes that actually rotated the token
    pub fn refresh_calls(&self) -> u32 {
        self.state.lock().unwrap().refresh_calls
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn init(&self) -> Result<bool, AuthError> {
        let state = self.state.lock().unwrap();
        if state.fail_init {
            return Err(AuthError::Handshake("provider unreachable".to_string()));
        }
        Ok(state.has_session)
    }

    async fn update_token(&self, min_validity: Duration) -> Result<bool, AuthError> {
        let mut state = self.state.lock().unwrap();

        let Some(claims) = state.claims.clone() else {
            return Err(AuthError::NotAuthenticated);
        };
        if claims.remaining_validity(now_secs()) > min_validity {
            return Ok(false);
        }
        if state.fail_refresh {
            state.token = None;
            state.claims = None;
            return Err(AuthError::Refresh("refresh token expired".to_string()));
        }

        state.refresh_calls += 1;
        let rotated = format!("token-{}", state.refresh_calls);
        let mut claims = claims;
        claims.exp = now_secs() + 3600;
        if let Some(roles) = state.roles_after_refresh.take() {
            claims.realm_access.roles = roles;
        }
        state.token = Some(rotated);
        state.claims = Some(claims);
        Ok(true)
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let mut state = self.state.lock().unwrap();
        if credentials.password != "correct horse" {
            return Err(AuthError::LoginRejected("invalid credentials".to_string()));
        }
        state.has_session = true;
        state.token = Some("token-0".to_string());
        state.claims = Some(TokenClaims {
            exp: now_secs() + 3600,
            sub: "user-1".to_string(),
            preferred_username: Some(credentials.username.clone()),
            realm_access: RealmAccess::default(),
        });
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock().unwrap();
        *state = MockState::default();
        Ok(())
    }

    fn login_url(&self, redirect_uri: &str) -> String {
        format!("http://mock/auth?redirect_uri={}", redirect_uri)
    }

    fn register_url(&self, redirect_uri: &str) -> String {
        format!("http://mock/registrations?redirect_uri={}", redirect_uri)
    }

    async fn token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    async fn token_claims(&self) -> Option<TokenClaims> {
        self.state.lock().unwrap().claims.clone()
    }

    async fn id_token_claims(&self) -> Option<IdTokenClaims> {
        self.state.lock().unwrap().id_claims.clone()
    }
}

// ============================================================================
// API fixture server
// ============================================================================

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("Bearer token-"))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Not authenticated" })),
    )
        .into_response()
}

async fn list_orchards(headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "name": "North Slope", "trees": [1, 2, 3] },
        { "id": 2, "name": "River Field", "trees": [] },
    ]))
    .into_response()
}

async fn get_orchard(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    match id {
        1 => Json(json!({ "id": 1, "name": "North Slope", "trees": [1, 2, 3] })).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Orchard not found" })),
        )
            .into_response(),
    }
}

async fn get_harvest(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    if !(1..=2).contains(&id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Harvest not found" })),
        )
            .into_response();
    }
    Json(json!({
        "id": id,
        "tree_id": 1,
        "datetime": "2025-09-14T07:00:00",
        "elapsed_time": 30,
        "fruit_under_60mm_quantity": 10,
        "fruit_under_60mm_weight": 500,
        "fruit_under_70mm_quantity": 20,
        "fruit_under_70mm_weight": 1300,
        "fruit_over_70mm_quantity": 5,
        "fruit_over_70mm_weight": 450,
        "average_fruit_weight": 64.3,
        "aphids_damage_quantity": 1,
        "aphids_damage_weight": 55,
        "damaged_percentage": 3
    }))
    .into_response()
}

/// Failure without a JSON error body, for the generic-message path
async fn boom() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Spawn the fixture API server on an ephemeral port; returns its base URL
pub async fn spawn_api_server() -> String {
    let app = Router::new()
        .route("/api/v1/orchard/", get(list_orchards))
        .route("/api/v1/orchard/:id", get(get_orchard))
        .route("/api/v1/harvest/:id", get(get_harvest))
        .route("/api/v1/boom", get(boom));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture server");
    let addr = listener.local_addr().expect("fixture server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture server");
    });

    format!("http://{}", addr)
}
