use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use ontop_core::{
    config::{path_from_env_value, provider_groups_from_env_value, user_id_scheme_from_env_value},
    constants::{DEFAULT_EXPORT_DIR, DEFAULT_RECORDS_PATH},
    CoreConfig, IdentityService,
};

/// Main entry point for the Ontop application
///
/// Loads the records document once, then serves the REST API (default: 0.0.0.0:3000).
/// A missing or malformed records document is logged and the server starts with an empty
/// store.
///
/// # Environment Variables
/// - `ONTOP_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `ONTOP_RECORDS_PATH`: Records document (default: "patients.json")
/// - `ONTOP_PROVIDER_GROUPS`: Comma-separated provider groups (default: "OonTop,eCW,AMD,Quest,Behavidance")
/// - `ONTOP_USER_ID_SCHEME`: "short" or "canonical" (default: "short")
/// - `ONTOP_EXPORT_DIR`: Directory for exported merges (default: ".")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ontop=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("ONTOP_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        path_from_env_value(std::env::var("ONTOP_RECORDS_PATH").ok(), DEFAULT_RECORDS_PATH),
        provider_groups_from_env_value(std::env::var("ONTOP_PROVIDER_GROUPS").ok()),
        user_id_scheme_from_env_value(std::env::var("ONTOP_USER_ID_SCHEME").ok())?,
        path_from_env_value(std::env::var("ONTOP_EXPORT_DIR").ok(), DEFAULT_EXPORT_DIR),
    )?);

    tracing::info!(
        "++ Provider groups: {}; user id scheme: {}",
        cfg.provider_groups().join(", "),
        cfg.user_id_scheme()
    );

    let service = IdentityService::new(cfg);
    let app = router(AppState::new(service));

    tracing::info!("++ Starting Ontop REST on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
