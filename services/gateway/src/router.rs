use crate::middleware::request_logging;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use shared::{Driver, Insight, Vehicle};
use std::sync::Arc;
use telemetry_service::{FleetCore, FleetSummary, MetricsView, PredictionSet};
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<FleetCore>,
}

impl AppState {
    pub fn new(core: Arc<FleetCore>) -> Self {
        Self { core }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound { entity: &'static str, id: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("no {} with id '{}'", entity, id),
                    "entity": entity,
                    "id": id,
                })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub running: bool,
    pub vehicles: usize,
    pub drivers: usize,
}

#[derive(Debug, Serialize)]
pub struct ClockResponse {
    pub now: DateTime<Utc>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/:id", get(get_vehicle))
        .route("/api/drivers", get(list_drivers))
        .route("/api/drivers/:id", get(get_driver))
        .route("/api/metrics", get(get_metrics))
        .route("/api/predictions", get(get_predictions))
        .route("/api/insights", get(list_insights))
        .route("/api/summary", get(get_summary))
        .route("/api/clock", get(get_clock))
        .with_state(state)
        .layer(axum::middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        running: state.core.is_running(),
        vehicles: state.core.vehicles().len(),
        drivers: state.core.drivers().len(),
    })
}

async fn list_vehicles(State(state): State<AppState>) -> Json<Vec<Vehicle>> {
    Json(state.core.vehicles())
}

async fn get_vehicle(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vehicle>, ApiError> {
    state
        .core
        .vehicle(&id)
        .map(Json)
        .ok_or(ApiError::NotFound { entity: "vehicle", id })
}

async fn list_drivers(State(state): State<AppState>) -> Json<Vec<Driver>> {
    Json(state.core.drivers())
}

async fn get_driver(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Driver>, ApiError> {
    state
        .core
        .driver(&id)
        .map(Json)
        .ok_or(ApiError::NotFound { entity: "driver", id })
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsView> {
    Json(state.core.metrics())
}

async fn get_predictions(State(state): State<AppState>) -> Json<PredictionSet> {
    Json(state.core.predictions())
}

async fn list_insights(State(state): State<AppState>) -> Json<Vec<Insight>> {
    Json(state.core.insights())
}

async fn get_summary(State(state): State<AppState>) -> Json<FleetSummary> {
    Json(state.core.fleet_summary())
}

async fn get_clock(State(state): State<AppState>) -> Json<ClockResponse> {
    Json(ClockResponse {
        now: state.core.clock(),
    })
}
