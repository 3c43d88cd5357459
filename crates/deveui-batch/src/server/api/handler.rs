use super::ApiError;
use crate::server::jobs::{BatchJob, BatchJobStore, JobQueue, JobStatus};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use deveui::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    store: Arc<BatchJobStore>,
    queue: Arc<JobQueue>,
    max_batch_size: usize,
}

impl AppState {
    pub const fn new(
        store: Arc<BatchJobStore>,
        queue: Arc<JobQueue>,
        max_batch_size: usize,
    ) -> Self {
        Self {
            store,
            queue,
            max_batch_size,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/batch", post(submit_batch).get(list_batches))
        .route("/batch/{id}", get(get_batch))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubmitBatch {
    #[serde(default = "default_batch_size")]
    batch_size: usize,
}

const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Serialize)]
struct BatchAccepted {
    id: Uuid,
    status: JobStatus,
}

async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<SubmitBatch>,
) -> Result<(StatusCode, Json<BatchAccepted>), ApiError> {
    if request.batch_size == 0 || request.batch_size > state.max_batch_size {
        return Err(ApiError::InvalidRequest {
            reason: format!(
                "batch_size must be between 1 and {}, got {}",
                state.max_batch_size, request.batch_size
            ),
        });
    }

    let job = state.queue.submit(request.batch_size)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(BatchAccepted {
            id: job.id,
            status: job.status,
        }),
    ))
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchJob>, ApiError> {
    state
        .store
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound { id })
}

async fn list_batches(State(state): State<AppState>) -> Json<Vec<BatchJob>> {
    Json(state.store.list())
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::testing::{AcceptAll, engine_config};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use core::time::Duration;
    use deveui::RegistrationEngine;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(max_batch_size: usize) -> (Router, Arc<JobQueue>) {
        let engine = RegistrationEngine::new(engine_config(), AcceptAll::default()).unwrap();
        let store = Arc::new(BatchJobStore::default());
        let queue = Arc::new(JobQueue::spawn(engine, Arc::clone(&store), 4));
        let state = AppState::new(store, Arc::clone(&queue), max_batch_size);
        (router(state), queue)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_batch(body: Value) -> Request<Body> {
        Request::post("/batch")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn accepted_batch_completes_with_registered_deveuis() {
        let (app, queue) = app(100);

        let (status, body) = send(&app, post_batch(json!({ "batch_size": 7 }))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "Processing");
        let id = body["id"].as_str().unwrap().to_string();

        let mut job = Value::Null;
        for _ in 0..200 {
            let (status, body) = send(&app, get(&format!("/batch/{id}"))).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] == "Completed" {
                job = body;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(job["id"], id.as_str());
        assert_eq!(job["batch_size"], 7);
        let deveuis = job["deveuis"].as_array().unwrap();
        assert_eq!(deveuis.len(), 7);
        for deveui in deveuis {
            let deveui = deveui.as_str().unwrap();
            assert_eq!(deveui.len(), 16);
            assert!(deveui.chars().all(|c| c.is_ascii_hexdigit()));
        }
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn batch_size_defaults_when_omitted() {
        let (app, queue) = app(1_000);

        let (status, body) = send(&app, post_batch(json!({}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let id = body["id"].as_str().unwrap();
        let (_, job) = send(&app, get(&format!("/batch/{id}"))).await;
        assert_eq!(job["batch_size"], DEFAULT_BATCH_SIZE);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn out_of_range_batch_size_is_bad_request() {
        let (app, queue) = app(50);

        let (status, body) = send(&app, post_batch(json!({ "batch_size": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("batch_size"));

        let (status, _) = send(&app, post_batch(json!({ "batch_size": 51 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, listed) = send(&app, get("/batch")).await;
        assert_eq!(listed, json!([]));
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_batch_is_not_found() {
        let (app, queue) = app(50);

        let (status, body) = send(&app, get(&format!("/batch/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn listing_returns_every_job() {
        let (app, queue) = app(50);

        let (_, first) = send(&app, post_batch(json!({ "batch_size": 2 }))).await;
        let (_, second) = send(&app, post_batch(json!({ "batch_size": 3 }))).await;

        let (status, listed) = send(&app, get("/batch")).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&Value> = listed.as_array().unwrap().iter().map(|job| &job["id"]).collect();
        assert_eq!(ids, vec![&first["id"], &second["id"]]);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn submissions_after_shutdown_are_unavailable() {
        let (app, queue) = app(50);
        queue.shutdown().await;

        let (status, _) = send(&app, post_batch(json!({ "batch_size": 1 }))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, queue) = app(50);

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
        queue.shutdown().await;
    }
}
