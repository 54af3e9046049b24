//! Session manager: owns the identity-provider client lifecycle, keeps the
//! access token fresh and derives orchard roles from realm-role claims.
//!
//! One instance lives at the application root and is passed down to pages
//! and services; consumers only ever see read-only snapshots and async
//! accessors, never the mutable state.

use crate::auth::roles::{RoleSet, parse_realm_roles};
use crate::auth::{AuthError, AuthProvider, Credentials, IdTokenClaims};
use crate::config::RefreshConfig;
use metrics::counter;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Current unix time in seconds
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Mutable session state, owned exclusively by the manager
#[derive(Default)]
struct SessionState {
    authenticated: bool,
    roles: RoleSet,
}

/// Read-only snapshot of the session for consumers
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub authenticated: bool,
    pub is_global_admin: bool,
    pub is_any_orchard_admin: bool,
    pub is_any_orchard_view: bool,
    pub admin_orchard_ids: HashSet<i64>,
    pub viewer_orchard_ids: HashSet<i64>,
}

/// Session manager: one authenticated session per application lifetime
pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    state: Arc<RwLock<SessionState>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    config: RefreshConfig,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self::with_config(provider, RefreshConfig::default())
    }

    pub fn with_config(provider: Arc<dyn AuthProvider>, config: RefreshConfig) -> Self {
        Self {
            provider,
            state: Arc::new(RwLock::new(SessionState::default())),
            refresh_task: Mutex::new(None),
            config,
        }
    }

    /// Perform the identity-provider handshake (silent session restore).
    ///
    /// Returns whether a session was restored. Failure leaves the session
    /// unauthenticated and is logged, never fatal.
    pub async fn initialize(&self) -> bool {
        match self.provider.init().await {
            Ok(true) => {
                self.sync_roles().await;
                {
                    let mut state = self.state.write().await;
                    state.authenticated = true;
                }
                self.arm_refresh();
                info!("Session restored from identity provider");
                true
            }
            Ok(false) => {
                debug!("No existing session at identity provider");
                false
            }
            Err(e) => {
                warn!("Identity provider handshake failed: {}", e);
                false
            }
        }
    }

    /// Return a currently valid access token, refreshing through the
    /// provider when remaining lifetime drops below the safety margin.
    ///
    /// Returns `None` if unauthenticated or the refresh fails; a failed
    /// call-path refresh is logged but does not tear the session down
    /// (only the scheduled refresh treats failure as expiry).
    pub async fn get_token(&self) -> Option<String> {
        if !self.authenticated().await {
            return None;
        }

        match self.provider.update_token(self.config.min_validity).await {
            Ok(refreshed) => {
                if refreshed {
                    counter!("orchard_token_refreshes_total").increment(1);
                    self.sync_roles().await;
                }
                self.provider.token().await
            }
            Err(e) => {
                warn!("Failed to get access token: {}", e);
                None
            }
        }
    }

    /// Log in with credentials (headless direct grant); restarts the
    /// refresh cycle on success.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.provider.login(credentials).await?;
        counter!("orchard_logins_total").increment(1);

        self.sync_roles().await;
        {
            let mut state = self.state.write().await;
            state.authenticated = true;
        }
        self.arm_refresh();
        info!("Logged in as {}", credentials.username);
        Ok(())
    }

    /// Browser URL for the provider's interactive login flow
    pub fn login_url(&self, redirect_uri: &str) -> String {
        self.provider.login_url(redirect_uri)
    }

    /// Browser URL for the provider's registration flow
    pub fn register_url(&self, redirect_uri: &str) -> String {
        self.provider.register_url(redirect_uri)
    }

    /// Log out: all derived state is cleared synchronously before the
    /// provider round trip, so stale permissions are never observable.
    pub async fn logout(&self) {
        self.cancel_refresh();
        {
            let mut state = self.state.write().await;
            state.authenticated = false;
            state.roles = RoleSet::default();
        }
        counter!("orchard_logouts_total").increment(1);

        if let Err(e) = self.provider.logout().await {
            // Local state is already gone; the provider session will time out
            warn!("Provider logout failed: {}", e);
        }
        info!("Logged out");
    }

    pub async fn authenticated(&self) -> bool {
        self.state.read().await.authenticated
    }

    /// Check realm roles against the current token
    pub async fn has_role(&self, role: &str) -> bool {
        if !self.authenticated().await {
            return false;
        }
        self.provider.has_realm_role(role).await
    }

    /// Logical OR over a list of realm roles
    pub async fn has_any_role(&self, roles: &[&str]) -> bool {
        if !self.authenticated().await {
            return false;
        }
        for role in roles {
            if self.provider.has_realm_role(role).await {
                return true;
            }
        }
        false
    }

    pub async fn is_global_admin(&self) -> bool {
        self.state.read().await.roles.is_global_admin
    }

    /// Global admin short-circuits to true; otherwise an explicit admin role
    pub async fn is_orchard_admin(&self, orchard_id: i64) -> bool {
        self.state.read().await.roles.is_orchard_admin(orchard_id)
    }

    /// Global admin and orchard admins can view implicitly
    pub async fn is_orchard_view(&self, orchard_id: i64) -> bool {
        self.state.read().await.roles.is_orchard_view(orchard_id)
    }

    pub async fn is_any_orchard_admin(&self) -> bool {
        self.state.read().await.roles.is_any_orchard_admin()
    }

    pub async fn is_any_orchard_view(&self) -> bool {
        self.state.read().await.roles.is_any_orchard_view()
    }

    pub async fn admin_orchard_ids(&self) -> HashSet<i64> {
        self.state.read().await.roles.admin_orchard_ids.clone()
    }

    pub async fn viewer_orchard_ids(&self) -> HashSet<i64> {
        self.state.read().await.roles.viewer_orchard_ids.clone()
    }

    /// Owned snapshot of the current role set
    pub async fn roles(&self) -> RoleSet {
        self.state.read().await.roles.clone()
    }

    /// Read-only snapshot of the whole session for consumers
    pub async fn context(&self) -> SessionContext {
        let state = self.state.read().await;
        SessionContext {
            authenticated: state.authenticated,
            is_global_admin: state.roles.is_global_admin,
            is_any_orchard_admin: state.roles.is_any_orchard_admin(),
            is_any_orchard_view: state.roles.is_any_orchard_view(),
            admin_orchard_ids: state.roles.admin_orchard_ids.clone(),
            viewer_orchard_ids: state.roles.viewer_orchard_ids.clone(),
        }
    }

    /// Parsed ID token claims for display, if authenticated
    pub async fn id_token_claims(&self) -> Option<IdTokenClaims> {
        if !self.authenticated().await {
            return None;
        }
        self.provider.id_token_claims().await
    }

    /// Cancel the armed refresh task; called on teardown
    pub fn shutdown(&self) {
        self.cancel_refresh();
    }

    /// Re-derive the role set from the provider's current token claims
    async fn sync_roles(&self) {
        let roles = match self.provider.token_claims().await {
            Some(claims) => parse_realm_roles(&claims.realm_access.roles),
            None => RoleSet::default(),
        };
        let mut state = self.state.write().await;
        state.roles = roles;
    }

    /// Arm the refresh scheduler, cancelling any pending task first so at
    /// most one timer is ever live.
    fn arm_refresh(&self) {
        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let config = self.config.clone();
        let handle = tokio::spawn(refresh_loop(provider, state, config));

        let mut slot = self
            .refresh_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }

    fn cancel_refresh(&self) {
        let mut slot = self
            .refresh_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.cancel_refresh();
    }
}

/// Self-perpetuating refresh schedule.
///
/// Each wake recomputes its delay from the freshly parsed expiry claim, so a
/// call-path refresh that rotated the token mid-sleep just folds into the
/// next iteration instead of causing a second near-expiry refresh. A failed
/// scheduled refresh is treated as session expiry: clear everything and stop
/// until an explicit login restarts the cycle.
async fn refresh_loop(
    provider: Arc<dyn AuthProvider>,
    state: Arc<RwLock<SessionState>>,
    config: RefreshConfig,
) {
    loop {
        let Some(claims) = provider.token_claims().await else {
            break;
        };
        tokio::time::sleep(next_delay(claims.exp, &config)).await;

        match provider.update_token(config.min_validity).await {
            Ok(refreshed) => {
                if refreshed {
                    counter!("orchard_token_refreshes_total").increment(1);
                    let roles = match provider.token_claims().await {
                        Some(claims) => parse_realm_roles(&claims.realm_access.roles),
                        None => RoleSet::default(),
                    };
                    let mut state = state.write().await;
                    state.roles = roles;
                    debug!("Access token refreshed on schedule");
                }
            }
            Err(e) => {
                counter!("orchard_token_refresh_failures_total").increment(1);
                error!(
                    "Scheduled token refresh failed, treating session as expired: {}",
                    e
                );
                let mut state = state.write().await;
                state.authenticated = false;
                state.roles = RoleSet::default();
                break;
            }
        }
    }
}

/// Delay until the next refresh: lead time before expiry, floored
fn next_delay(exp: u64, config: &RefreshConfig) -> Duration {
    let until_expiry = Duration::from_secs(exp.saturating_sub(now_secs()));
    until_expiry
        .saturating_sub(config.lead_time)
        .max(config.min_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_floors_at_min_delay() {
        let config = RefreshConfig::default();
        // Already expired
        assert_eq!(next_delay(0, &config), config.min_delay);
        // Expires inside the lead window
        assert_eq!(next_delay(now_secs() + 3, &config), config.min_delay);
    }

    #[test]
    fn test_next_delay_subtracts_lead_time() {
        let config = RefreshConfig::default();
        let delay = next_delay(now_secs() + 300, &config);
        // 300s out minus the 10s lead, allowing a second of clock skew
        assert!(delay >= Duration::from_secs(288) && delay <= Duration::from_secs(290));
    }

    #[test]
    fn test_default_context_is_empty() {
        let ctx = SessionContext::default();
        assert!(!ctx.authenticated);
        assert!(!ctx.is_global_admin);
        assert!(ctx.admin_orchard_ids.is_empty());
        assert!(ctx.viewer_orchard_ids.is_empty());
    }
}
