//! Authentication module
//!
//! This module provides:
//! - `AuthProvider` trait for abstracting the identity-provider client
//! - `KeycloakProvider` for talking to a Keycloak realm over HTTP
//! - Realm-role parsing into an orchard-scoped `RoleSet`

mod keycloak;
mod provider;
pub mod roles;

pub use keycloak::KeycloakProvider;
pub use provider::{AuthError, AuthProvider, Credentials, IdTokenClaims, RealmAccess, TokenClaims};
pub use roles::{RoleSet, parse_realm_roles};
