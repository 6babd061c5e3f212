//! HTTP routes: the occupancy API, the WebSocket push and the embedded dashboard.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `POST` | `/api/movimiento` | Validate a report and replace the stored state |
//! | `GET` | `/api/estado` | Current snapshot |
//! | `GET` | `/api/estado/ws` | WebSocket stream of snapshots |
//! | `GET` | `/healthz` | Liveness + revision counter |
//! | `GET` | `/`, `/app.js`, `/style.css` | Dashboard assets |

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        State,
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use futures_util::{SinkExt, StreamExt};
use parkwatch_store::{StateStore, StateSubscriber};
use parkwatch_types::{
    HealthStatus, INVALID_DATA, IngestAck, MovementReport, OccupancyState, ParkError,
};
use tracing::{debug, info, warn};

use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("assets/index.html");
const APP_JS: &str = include_str!("assets/app.js");
const STYLE_CSS: &str = include_str!("assets/style.css");

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<StateStore>,
}

/// Build the application router backed by `store`.
///
/// Middleware (tracing, CORS, timeouts) is added by
/// [`ParkServer`](crate::ParkServer); the bare router is what tests drive.
pub fn router(store: Arc<StateStore>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/app.js", get(app_js))
        .route("/style.css", get(style_css))
        .route("/healthz", get(health))
        .route("/api/movimiento", post(ingest))
        .route("/api/estado", get(current_state))
        .route("/api/estado/ws", get(state_stream))
        .with_state(AppState { store })
}

// ---------------------------------------------------------------------------
// Occupancy API
// ---------------------------------------------------------------------------

async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<MovementReport>, JsonRejection>,
) -> Result<Json<IngestAck>, ApiError> {
    let report = match payload {
        Ok(Json(report)) => report,
        // A body sent without a JSON content type is not read at all.
        Err(JsonRejection::MissingJsonContentType(rejection)) => {
            debug!(error = %rejection, "movement report without JSON content type");
            MovementReport::default()
        }
        Err(rejection) => {
            warn!(error = %rejection, "unreadable movement report");
            return Err(ParkError::InvalidInput(INVALID_DATA.to_string()).into());
        }
    };

    let movement = report.movement.clone();
    let spaces = report.spaces;
    let snapshot = report.validate().inspect_err(|e| {
        warn!(movement = ?movement, spaces = ?spaces, error = %e, "movement report rejected");
    })?;

    let movement = snapshot.movement_or("").to_string();
    let spaces = snapshot.available_spaces;
    let revision = state.store.replace(snapshot);
    info!(movement = %movement, spaces, revision, "movement report received");

    Ok(Json(IngestAck::ok()))
}

async fn current_state(State(state): State<AppState>) -> Json<OccupancyState> {
    Json(state.store.read())
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        revision: state.store.revision(),
    })
}

// ---------------------------------------------------------------------------
// WebSocket push
// ---------------------------------------------------------------------------

async fn state_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let updates = state.store.subscribe();
    ws.on_upgrade(move |socket| push_snapshots(socket, updates))
}

/// Send the current snapshot, then one frame per write, until the client
/// disconnects.
async fn push_snapshots(socket: WebSocket, mut updates: StateSubscriber) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    debug!("state stream client connected");

    loop {
        tokio::select! {
            reading = updates.next() => {
                let Some(reading) = reading else { break };
                match serde_json::to_string(&reading.state) {
                    Ok(json) => {
                        if ws_tx.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "snapshot serialization failed"),
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    debug!("state stream client disconnected");
}

// ---------------------------------------------------------------------------
// Dashboard assets
// ---------------------------------------------------------------------------

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}

async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
