//! REST backend collaborator
//!
//! This module provides:
//! - `ApiClient` for bearer-authenticated JSON calls under the versioned prefix
//! - Entity models mirroring the backend schemas
//! - Typed per-resource wrappers, including by-id-list join helpers

mod client;
pub mod models;
mod resources;

pub use client::{ApiClient, ApiError};
