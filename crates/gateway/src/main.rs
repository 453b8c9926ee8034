//! Cinescope API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Movie catalog and social endpoints under /theater
//! - Bearer-token authentication and group authorization
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, post},
    Router,
};
use cinescope_common::{
    auth::JwtManager,
    config::AppConfig,
    db::DbPool,
    metrics,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub jwt: Arc<JwtManager>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .json()
        .init();

    info!("Starting Cinescope API Gateway v{}", cinescope_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();

    if config.observability.metrics_port > 0 {
        PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port)))
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                metrics::LATENCY_BUCKETS,
            )?
            .install()?;
        info!(
            port = config.observability.metrics_port,
            "Prometheus exporter listening"
        );
    }

    // Token verification is mandatory; refuse to start without a secret
    let jwt = Arc::new(JwtManager::from_config(&config.auth).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize JWT manager");
        e
    })?);

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        jwt,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Catalog and social endpoints; trailing slashes follow the public API contract
    let theater_routes = Router::new()
        // Movie catalog
        .route(
            "/movies/",
            get(handlers::movies::list_movies).post(handlers::movies::create_movie),
        )
        .route(
            "/movies/{movie_id}/",
            get(handlers::movies::get_movie)
                .patch(handlers::movies::update_movie)
                .delete(handlers::movies::delete_movie),
        )
        .route("/movies_filter/", get(handlers::movies::filter_movies))
        .route("/movies_sorted/", get(handlers::movies::sort_movies))
        .route("/movies_search/", get(handlers::movies::search_movies))
        // Likes
        .route("/movies/like", post(handlers::likes::like_movie))
        .route("/movies/{movie_id}/likes", get(handlers::likes::movie_like_stats))
        // Genres
        .route("/genres/", get(handlers::genres::list_genres))
        .route("/genres/{genre_id}/movies/", get(handlers::genres::movies_by_genre))
        // Favorites
        .route(
            "/favorites/",
            get(handlers::favorites::list_favorites).post(handlers::favorites::add_favorite),
        )
        .route("/favorite_remove/", delete(handlers::favorites::remove_favorite))
        // Ratings
        .route("/ratings/", post(handlers::ratings::rate_movie))
        // Comments
        .route("/comments/", post(handlers::comments::create_comment))
        .route("/comments/{comment_id}/reply", post(handlers::comments::reply_to_comment))
        .route("/comments/{comment_id}/like", post(handlers::comments::like_comment))
        // Notifications
        .route("/notifications/", get(handlers::notifications::list_notifications))
        .route("/notifications/mark-read/", post(handlers::notifications::mark_read));

    // Compose the app
    Router::new()
        .nest("/theater", theater_routes)
        // Health endpoints (no auth, unnested)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .layer(axum::middleware::from_fn(middleware::metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cinescope_common::config::AuthConfig;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn state_with(db: MockDatabase) -> AppState {
        let auth = AuthConfig {
            jwt_secret: Some("router-test-secret".to_string()),
            ..Default::default()
        };
        AppState {
            config: Arc::new(AppConfig::default()),
            db: DbPool {
                primary: db.into_connection(),
                replica: None,
            },
            jwt: Arc::new(JwtManager::from_config(&auth).unwrap()),
        }
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = create_router(state_with(MockDatabase::new(DatabaseBackend::Postgres)));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_rejects_missing_token() {
        let app = create_router(state_with(MockDatabase::new(DatabaseBackend::Postgres)));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/theater/notifications/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_catalog_reports_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            BTreeMap::from([("num_items", Value::BigInt(Some(0)))]),
        ]]);
        let app = create_router(state_with(db));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/theater/movies/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
