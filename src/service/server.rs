//! HTTP and WebSocket front end for the descriptor store.
//!
//! Endpoints:
//! - POST /save-face             - enroll `{name, faceDescriptor}`
//! - POST /check-attendance      - match `{faceDescriptor}` against enrolled faces
//! - GET  /face                  - every enrolled record, oldest first
//! - GET  /health                - store size and active threshold
//! - GET  /socket                - WebSocket stream of attendance events
//! - GET  /webcam_face_detection - capture page, when a views dir is configured
//!
//! Anything else falls through to the configured static directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::common::{AttendanceError, Config, Result};
use crate::common::config::MatchingConfig;
use crate::core::matcher::MatchResult;
use crate::service::events::{AttendanceEvent, EventHub};
use crate::service::protocol::{
    parse_check, parse_enroll, CheckResponse, HealthResponse, ENROLL_OK, INVALID_FACE_DATA,
    INVALID_FACE_DESCRIPTOR, NO_MATCHING_FACE,
};
use crate::storage::DescriptorStore;

const WEBCAM_PAGE: &str = "webcamFaceDetection.html";

/// Everything the handlers share. Built once at startup.
pub struct AppState {
    pub store: Arc<DescriptorStore>,
    pub events: EventHub,
    pub matching: MatchingConfig,
    pub views_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: Arc::new(DescriptorStore::new()),
            events: EventHub::new(config.events.channel_capacity),
            matching: config.matching.clone(),
            views_dir: config.assets.views_dir.clone(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Failures a handler can report, each with the body the client expects.
#[derive(Debug)]
enum ApiError {
    InvalidFaceData,
    InvalidFaceDescriptor,
    NoMatch,
    DimensionMismatch(String),
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidFaceData => (StatusCode::BAD_REQUEST, INVALID_FACE_DATA).into_response(),
            ApiError::InvalidFaceDescriptor => {
                (StatusCode::BAD_REQUEST, INVALID_FACE_DESCRIPTOR).into_response()
            }
            ApiError::NoMatch => (StatusCode::NOT_FOUND, NO_MATCHING_FACE).into_response(),
            ApiError::DimensionMismatch(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

/// Build the router. Static directories and the capture page are only
/// mounted when configured.
pub fn create_router(state: SharedState, config: &Config) -> Router {
    let mut app = Router::new()
        .route("/save-face", post(save_face))
        .route("/check-attendance", post(check_attendance))
        .route("/face", get(list_faces))
        .route("/health", get(health))
        .route("/socket", get(socket_upgrade));

    if state.views_dir.is_some() {
        app = app.route("/webcam_face_detection", get(webcam_page));
    }

    let mut app = app.with_state(state);

    let static_dirs: Vec<PathBuf> = config
        .assets
        .views_dir
        .iter()
        .chain(config.assets.static_dirs.iter())
        .cloned()
        .collect();
    if !static_dirs.is_empty() {
        for dir in static_dirs.iter().filter(|dir| !dir.exists()) {
            tracing::warn!("Static dir not found: {}", dir.display());
        }
        app = app.fallback_service(static_fallback(&static_dirs));
    }

    app = app.layer(TraceLayer::new_for_http());

    if config.server.cors_permissive {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Chain `ServeDir`s so each directory is tried in order before a 404.
fn static_fallback(dirs: &[PathBuf]) -> Router {
    dirs.iter().rev().fold(Router::new(), |next, dir| {
        Router::new().fallback_service(ServeDir::new(dir).fallback(next))
    })
}

/// Bind the configured host and port. The host may be an IP address or a
/// name such as `localhost`.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let host = config.server.host.as_str();
    let port = config.server.port;
    TcpListener::bind((host, port)).await.map_err(|e| {
        AttendanceError::Config(format!("Failed to bind {}:{}: {}", host, port, e))
    })
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let listener = bind(config).await?;
    let addr = listener.local_addr()?;

    let state = Arc::new(AppState::new(config));
    let router = create_router(state, config);

    tracing::info!("Server is running on {}", addr);
    tracing::info!(
        "Distance threshold {} (mismatch policy: {:?})",
        config.matching.distance_threshold, config.matching.mismatch_policy
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn save_face(
    State(state): State<SharedState>,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let record = parse_enroll(&body).map_err(|e| {
        tracing::debug!("Rejected enrollment: {}", e);
        ApiError::InvalidFaceData
    })?;

    let name = record.identity().to_string();
    state.store.insert(record);

    tracing::info!("Saved face data for '{}' ({} enrolled)", name, state.store.len());
    state.events.publish(AttendanceEvent::enrolled(name));

    Ok((StatusCode::OK, ENROLL_OK))
}

async fn check_attendance(
    State(state): State<SharedState>,
    body: Bytes,
) -> std::result::Result<Json<CheckResponse>, ApiError> {
    let query = parse_check(&body).map_err(|e| {
        tracing::debug!("Rejected attendance check: {}", e);
        ApiError::InvalidFaceDescriptor
    })?;

    let result = state
        .store
        .find_closest(&query, state.matching.distance_threshold, state.matching.mismatch_policy)
        .map_err(|e| match e {
            AttendanceError::DimensionMismatch { .. } => {
                tracing::warn!("Attendance check failed: {}", e);
                ApiError::DimensionMismatch(e.to_string())
            }
            AttendanceError::InvalidInput(_) => ApiError::InvalidFaceDescriptor,
            other => ApiError::Internal(other.to_string()),
        })?;

    state.events.publish(AttendanceEvent::from_match(&result));

    match result {
        MatchResult::Match { identity, distance } => {
            tracing::info!("Attendance matched '{}' at distance {:.4}", identity, distance);
            Ok(Json(CheckResponse { name: identity }))
        }
        MatchResult::NoMatch => {
            tracing::info!("Attendance check found no match");
            Err(ApiError::NoMatch)
        }
    }
}

async fn list_faces(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.store.all())
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        enrolled: state.store.len(),
        threshold: state.matching.distance_threshold,
    })
}

async fn webcam_page(State(state): State<SharedState>) -> std::result::Result<Html<String>, ApiError> {
    let views_dir = state.views_dir.as_deref().ok_or(ApiError::NotFound)?;
    read_page(views_dir, WEBCAM_PAGE).await.map(Html)
}

async fn read_page(dir: &Path, name: &str) -> std::result::Result<String, ApiError> {
    let path = dir.join(name);
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            tracing::warn!("Page not found: {}", path.display());
            ApiError::NotFound
        } else {
            ApiError::Internal(format!("Failed to read {}: {}", path.display(), e))
        }
    })
}

async fn socket_upgrade(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    let events = state.events.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

/// Push attendance events to one client until either side goes away.
/// Inbound messages carry no meaning and are dropped.
async fn handle_socket(socket: WebSocket, events: EventHub) {
    tracing::info!("a user connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = events.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("Failed to encode event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Socket lagged, dropped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => tracing::debug!("Ignoring inbound socket message"),
                Some(Err(e)) => {
                    tracing::debug!("Socket error: {}", e);
                    break;
                }
            },
        }
    }

    tracing::info!("user disconnected");
}
