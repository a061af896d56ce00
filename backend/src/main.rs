use axum::http::{HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use sharetaxi::{get_db_pool, handlers, services::PushService, utils, AppState, Config};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = sharetaxi::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    sharetaxi::db::migrations::run_migrations(&pool).await?;

    let push = PushService::new(
        config.push_gateway_url.clone(),
        config.push_access_token.clone(),
    );
    if !push.is_configured() {
        tracing::warn!("PUSH_GATEWAY_URL not set, notifications will only be logged");
    }

    let port = config.port;
    let app = create_router(AppState { pool, config, push });

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Building & resident directory
        .route("/api/buildings", post(handlers::directory::create_building))
        .route("/api/users", post(handlers::directory::register_user))
        // Rides: creating one triggers matching inline
        .route("/api/rides", post(handlers::rides::create_ride))
        .route("/api/rides/{id}", get(handlers::rides::get_ride))
        .route(
            "/api/rides/{id}/matches",
            get(handlers::matches::get_ride_matches),
        )
        // Match lifecycle
        .route(
            "/api/matches/{id}/respond",
            post(handlers::matches::respond_to_match),
        )
        .layer(create_cors_layer())
        .with_state(state)
}

fn create_cors_layer() -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    // ALLOWED_ORIGINS is a comma-separated list; default is permissive for dev
    let origins: Vec<HeaderValue> = std::env::var("ALLOWED_ORIGINS")
        .map(|value| {
            value
                .split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    (!trimmed.is_empty()).then(|| trimmed.parse().ok()).flatten()
                })
                .collect()
        })
        .unwrap_or_default();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

async fn health_check() -> &'static str {
    "OK"
}
