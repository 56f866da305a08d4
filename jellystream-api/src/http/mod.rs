pub mod channels;
pub mod error;
pub mod livetv;
pub mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full router; callers add the `AppState` and bind a listener.
///
/// The stream route is kept out of the request-timeout layer: it is an
/// intentionally endless MPEG-TS connection (spec §4.4), and tower-http's
/// timeout would otherwise sever it after the configured duration.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    let stream_routes = Router::new().route(
        "/api/livetv/stream/{channel_id}",
        get(livetv::stream).head(livetv::stream_probe),
    );

    let bounded_routes = Router::new()
        .route("/api/livetv/m3u/all", get(livetv::m3u_all))
        .route("/api/livetv/m3u/{channel_id}", get(livetv::m3u_one))
        .route("/api/livetv/xmltv/all", get(livetv::xmltv_all))
        .route("/api/livetv/xmltv/{channel_id}", get(livetv::xmltv_one))
        .route("/api/livetv/thumbnail/{entry_id}", get(livetv::thumbnail))
        .route("/api/channels/{id}/generate-schedule", post(channels::generate_schedule))
        .route(
            "/api/channels/{id}/register-livetv",
            post(channels::register_livetv).delete(channels::unregister_livetv),
        )
        .route("/healthz", get(health))
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    stream_routes
        .merge(bounded_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
