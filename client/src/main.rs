use orchard_client::api::ApiClient;
use orchard_client::auth::{AuthProvider, Credentials, KeycloakProvider};
use orchard_client::config::Config;
use orchard_client::session::SessionManager;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Headless session diagnostic: restores or opens a session against the
/// configured Keycloak realm and prints the derived orchard permissions.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orchard_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: keycloak={} realm={} api={}{}",
        config.keycloak.base_url, config.keycloak.realm, config.api.base_url, config.api.prefix
    );

    let mut provider = KeycloakProvider::new(config.keycloak.clone());
    if let Ok(refresh_token) = env::var("KEYCLOAK_REFRESH_TOKEN")
        && !refresh_token.is_empty()
    {
        provider = provider.with_refresh_token(refresh_token);
    }
    let provider: Arc<dyn AuthProvider> = Arc::new(provider);
    let session = Arc::new(SessionManager::with_config(
        provider,
        config.refresh.clone(),
    ));

    // Silent restore first, credentials as fallback
    let restored = session.initialize().await;
    if !restored
        && let (Ok(username), Ok(password)) =
            (env::var("KEYCLOAK_USERNAME"), env::var("KEYCLOAK_PASSWORD"))
    {
        session.login(&Credentials { username, password }).await?;
    }

    let context = session.context().await;
    if !context.authenticated {
        println!("Not authenticated.");
        println!(
            "Set KEYCLOAK_REFRESH_TOKEN or KEYCLOAK_USERNAME/KEYCLOAK_PASSWORD, or log in at:"
        );
        println!("  {}", session.login_url("http://localhost:5173/"));
        return Ok(());
    }

    if let Some(id_claims) = session.id_token_claims().await {
        println!(
            "Logged in as {} <{}>",
            id_claims.preferred_username.unwrap_or_else(|| id_claims.sub.clone()),
            id_claims.email.unwrap_or_default()
        );
    }
    println!("Global admin:       {}", context.is_global_admin);
    println!("Admin orchard ids:  {:?}", context.admin_orchard_ids);
    println!("Viewer orchard ids: {:?}", context.viewer_orchard_ids);

    if env::args().any(|arg| arg == "--list-orchards") {
        let api = ApiClient::new(&config.api, Arc::clone(&session));
        match api.fetch_orchards().await {
            Ok(orchards) => {
                println!("Orchards ({}):", orchards.len());
                for orchard in orchards {
                    println!(
                        "  #{} {} ({} trees)",
                        orchard.id,
                        orchard.name,
                        orchard.trees.len()
                    );
                }
            }
            Err(e) => println!("Failed to list orchards: {}", e),
        }
    }

    session.shutdown();
    Ok(())
}
