//! Client configuration
//!
//! Configuration is loaded from environment variables. See `.env.example` for documentation.

use std::env;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity provider configuration
    pub keycloak: KeycloakConfig,
    /// Backend API configuration
    pub api: ApiConfig,
    /// Token refresh scheduling configuration
    pub refresh: RefreshConfig,
}

/// Identity provider (Keycloak) configuration
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Base URL of the Keycloak server
    pub base_url: String,
    /// Realm name
    pub realm: String,
    /// Client ID registered in the realm
    pub client_id: String,
}

/// Backend API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend server
    pub base_url: String,
    /// Versioned API prefix
    pub prefix: String,
}

/// Token refresh scheduling configuration
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// How long before token expiry the scheduled refresh fires
    pub lead_time: Duration,
    /// Minimum remaining validity below which a token is refreshed on use
    pub min_validity: Duration,
    /// Floor for the scheduled refresh delay
    pub min_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keycloak: KeycloakConfig::default(),
            api: ApiConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl Default for KeycloakConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            realm: "OrchardRealm".to_string(),
            client_id: "orchard-client".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            prefix: "/api/v1".to_string(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            lead_time: Duration::from_secs(10),
            min_validity: Duration::from_secs(5),
            min_delay: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Identity provider config
        if let Ok(url) = env::var("KEYCLOAK_URL")
            && !url.is_empty()
        {
            config.keycloak.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(realm) = env::var("KEYCLOAK_REALM") {
            config.keycloak.realm = realm;
        }
        if let Ok(client_id) = env::var("KEYCLOAK_CLIENT_ID") {
            config.keycloak.client_id = client_id;
        }

        // API config
        if let Ok(url) = env::var("API_BASE_URL")
            && !url.is_empty()
        {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(prefix) = env::var("API_PREFIX") {
            config.api.prefix = prefix;
        }

        // Refresh config
        if let Ok(val) = env::var("TOKEN_REFRESH_LEAD_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.refresh.lead_time = Duration::from_secs(secs);
        }
        if let Ok(val) = env::var("TOKEN_MIN_VALIDITY_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.refresh.min_validity = Duration::from_secs(secs);
        }

        config
    }
}
