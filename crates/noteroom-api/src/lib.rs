//! # noteroom-api
//!
//! HTTP API and realtime gateway for noteroom: note CRUD over REST plus a
//! WebSocket fan-out channel for room presence and live note announcements.
//!
//! The two channels are deliberately independent: clients persist a change
//! through the REST API, then separately announce it on the socket. The
//! gateway never writes to the store.

pub mod error;
pub mod gateway;
pub mod handlers;

use std::num::NonZeroU32;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use noteroom_core::RoomRegistry;
use noteroom_db::Database;

pub use error::ApiError;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation when tracing a REST write and the socket announcement that
/// follows it.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Room presence registry. Empty at process start, lost on restart.
    pub rooms: Arc<RoomRegistry>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
    /// Active realtime connection count.
    pub ws_connections: Arc<AtomicUsize>,
}

impl AppState {
    /// Assemble state around a database handle, with a fresh room registry
    /// and rate limiting disabled.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            rooms: Arc::new(RoomRegistry::new(256)),
            rate_limiter: None,
            ws_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Enable global rate limiting: `requests` per `period`, shared across
    /// all clients. Invalid configuration (zero requests or period) is
    /// ignored with a warning.
    pub fn with_rate_limit(mut self, requests: u32, period: std::time::Duration) -> Self {
        let quota = Quota::with_period(period)
            .and_then(|q| NonZeroU32::new(requests).map(|n| q.allow_burst(n)));
        match quota {
            Some(q) => self.rate_limiter = Some(Arc::new(RateLimiter::direct(q))),
            None => tracing::warn!(requests, "Invalid rate limit configuration ignored"),
        }
        self
    }
}

/// Parse allowed CORS origins from the comma-separated `ALLOWED_ORIGINS`
/// environment variable. Defaults to the local dev client origin.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str =
        std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        origins
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_allowed_origins()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Notes CRUD
        .route("/api/notes", post(handlers::notes::create_note))
        .route(
            "/api/notes/room/:room_id",
            get(handlers::notes::list_room_notes),
        )
        .route(
            "/api/notes/:id",
            put(handlers::notes::update_note).delete(handlers::notes::delete_note),
        )
        // Rate limiting status endpoint
        .route("/api/rate-limit/status", get(rate_limit_status))
        // Realtime gateway
        .route("/ws", get(gateway::ws_handler))
        // Middleware
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer())
        // Notes are plain text; anything above 1 MiB is not a note.
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "message": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

/// Get rate limiting status.
async fn rate_limit_status(State(state): State<AppState>) -> impl IntoResponse {
    if state.rate_limiter.is_some() {
        Json(serde_json::json!({
            "enabled": true,
            "message": "Rate limiting is active"
        }))
    } else {
        Json(serde_json::json!({
            "enabled": false,
            "message": "Rate limiting is disabled"
        }))
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
