//! HTTP shell over the aggregation engine and leaderboard reader
//!
//! - `POST /take` - submit `{players: [...]}`
//! - `GET /leaderboard` - current day / week / month boards
//! - `GET /leaderboard/:period[/:date]` - one board, optionally for a past date
//! - `GET /state` - last raw submission
//! - `GET /health`

use crate::aggregation::AggregationEngine;
use crate::leaderboard::{CurrentLeaderboards, LeaderboardError, LeaderboardReader};
use crate::record::ScoreRecord;
use crate::state::ProcessState;
use crate::store::RecordStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<LeaderboardError> for ApiError {
    fn from(err: LeaderboardError) -> Self {
        match err {
            LeaderboardError::InvalidPeriod(_) | LeaderboardError::InvalidDate(_) => {
                ApiError::BadRequest(err.to_string())
            }
            LeaderboardError::Storage(e) => {
                log::error!("❌ Leaderboard read failed: {}", e);
                ApiError::Internal("Failed to read leaderboard from database".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Entries are parsed one by one by the engine
    pub players: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub data: Vec<ScoreRecord>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
    pub reader: Arc<LeaderboardReader>,
    pub process_state: Arc<ProcessState>,
    /// Timestamp function (mock time in tests)
    pub now_fn: Arc<dyn Fn() -> NaiveDateTime + Send + Sync>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        now_fn: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        Self {
            engine: Arc::new(AggregationEngine::new(store.clone())),
            reader: Arc::new(LeaderboardReader::new(store)),
            process_state: Arc::new(ProcessState::new()),
            now_fn: Arc::new(now_fn),
        }
    }

    fn now(&self) -> NaiveDateTime {
        (self.now_fn)()
    }
}

/// POST /take
///
/// Any body with a `players` array is accepted and answers success; malformed
/// entries and per-record storage failures are only logged by the engine.
pub async fn take(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SubmitResponse>, ApiError> {
    state.process_state.replace(body.clone()).await;

    let request: SubmitRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid submission: {}", e)))?;

    state
        .engine
        .submit_entries(&request.players, state.now())
        .await;

    Ok(Json(SubmitResponse {
        message: "Data saved".to_string(),
    }))
}

/// GET /leaderboard
pub async fn current_boards(State(state): State<AppState>) -> Json<CurrentLeaderboards> {
    Json(state.reader.read_all_current(state.now()).await)
}

/// GET /leaderboard/:period
pub async fn period_board(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<BoardResponse>, ApiError> {
    let data = state.reader.read_current(&period, None, state.now()).await?;
    Ok(Json(BoardResponse { data }))
}

/// GET /leaderboard/:period/:date
pub async fn period_board_on_date(
    State(state): State<AppState>,
    Path((period, date)): Path<(String, String)>,
) -> Result<Json<BoardResponse>, ApiError> {
    let data = state
        .reader
        .read_current(&period, Some(&date), state.now())
        .await?;
    Ok(Json(BoardResponse { data }))
}

/// GET /state
pub async fn last_batch(State(state): State<AppState>) -> Json<Value> {
    Json(state.process_state.snapshot().await)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/take", post(take))
        .route("/leaderboard", get(current_boards))
        .route("/leaderboard/:period", get(period_board))
        .route("/leaderboard/:period/:date", get(period_board_on_date))
        .route("/state", get(last_batch))
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRecordStore;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn create_test_app() -> (tempfile::TempDir, Router) {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            SqliteRecordStore::new(dir.path().join("api.db"), Duration::from_secs(1)).unwrap(),
        );
        let app = router(AppState::new(store, fixed_now));
        (dir, app)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_take_then_leaderboard() {
        let (_dir, app) = create_test_app();

        let batch = json!({"players": [
            {"id": "p1", "name": "Ann", "score": 30},
            {"id": "p2", "name": "Bob", "score": 10},
            {"id": "p3", "name": "Cid", "score": 20},
            {"name": "nobody", "score": 99}
        ]});
        let response = send(&app, post_json("/take", batch)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Data saved");

        let response = send(&app, get("/leaderboard")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let boards = body_json(response).await;
        for period in ["day", "week", "month"] {
            let ids: Vec<&str> = boards[period]
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["id"].as_str().unwrap())
                .collect();
            assert_eq!(ids, vec!["p1", "p3", "p2"], "{} board", period);
        }
        assert_eq!(boards["day"][0]["name"], "Ann");
        assert_eq!(boards["day"][0]["time"], "01:09:2024 15:00:00");
        assert_eq!(boards["day"][0]["score"].to_string(), "30");
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_drop_batch() {
        let (_dir, app) = create_test_app();

        let batch = json!({"players": [
            {"id": "good", "name": "A", "score": 10},
            {"id": "no_score", "name": "B"},
            {"id": "text_score", "name": "C", "score": "10"},
            {"id": true, "name": "D", "score": 4},
            "not an object"
        ]});
        let response = send(&app, post_json("/take", batch)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let boards = body_json(send(&app, get("/leaderboard")).await).await;
        for period in ["day", "week", "month"] {
            let board = boards[period].as_array().unwrap();
            assert_eq!(board.len(), 1, "{} board", period);
            assert_eq!(board[0]["id"], "good");
        }
    }

    #[tokio::test]
    async fn test_period_board_with_date() {
        let (_dir, app) = create_test_app();

        let batch = json!({"players": [{"id": "p1", "name": "Ann", "score": 5}]});
        send(&app, post_json("/take", batch)).await;

        let response = send(&app, get("/leaderboard/week")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"][0]["id"], "p1");

        let response = send(&app, get("/leaderboard/day/2024-09-01")).await;
        let board = body_json(response).await;
        assert_eq!(board["data"].as_array().unwrap().len(), 1);

        let response = send(&app, get("/leaderboard/month/2024-08-15")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let board = body_json(response).await;
        assert!(board["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_period_is_bad_request() {
        let (_dir, app) = create_test_app();

        let response = send(&app, get("/leaderboard/year")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        assert!(error["error"].as_str().unwrap().contains("year"));
    }

    #[tokio::test]
    async fn test_bad_date_is_bad_request() {
        let (_dir, app) = create_test_app();

        let response = send(&app, get("/leaderboard/day/not-a-date")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_take_without_players_is_rejected() {
        let (_dir, app) = create_test_app();

        let response = send(&app, post_json("/take", json!({"scores": []}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // still recorded as the last raw batch
        let response = send(&app, get("/state")).await;
        assert_eq!(body_json(response).await, json!({"scores": []}));
    }

    #[tokio::test]
    async fn test_state_tracks_last_batch() {
        let (_dir, app) = create_test_app();

        let response = send(&app, get("/state")).await;
        assert_eq!(body_json(response).await, json!({}));

        let batch = json!({"players": [{"id": "p1", "name": "Ann", "score": 1}]});
        send(&app, post_json("/take", batch.clone())).await;

        let response = send(&app, get("/state")).await;
        assert_eq!(body_json(response).await, batch);
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = create_test_app();

        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
