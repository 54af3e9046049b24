//! Orchard Client Library
//!
//! Client core for the Orchard farm-management system: a Keycloak-backed
//! session manager (token lifecycle, refresh scheduling, realm-role
//! derivation) and a bearer-authenticated REST client for the backend API.

pub mod api;
pub mod auth;
pub mod config;
pub mod session;

// Re-export commonly used types
pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthProvider, Credentials, KeycloakProvider, RoleSet, TokenClaims};
pub use session::{SessionContext, SessionManager};
