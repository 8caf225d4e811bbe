//! API handlers for the server.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use eco_core::{Census, EcosystemConfig, GridSnapshot};
use eco_world::{Ecosystem, Population};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// The single simulation instance. The lock is held for a whole
/// initialization, tick or read so no caller sees a half-finished tick.
#[derive(Clone)]
pub struct AppState {
    pub ecosystem: Arc<Mutex<Ecosystem>>,
}

impl AppState {
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem: Arc::new(Mutex::new(ecosystem)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/start-simulation", post(start_simulation))
        .route("/next-iteration", get(next_iteration))
        .route("/api/stats", get(get_stats))
        .route("/api/config", get(get_config))
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    plants: usize,
    herbivores: usize,
    carnivores: usize,
}

/// Reset the world and place a new starting population
pub async fn start_simulation(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<GridSnapshot>, ApiError> {
    info!(
        plants = req.plants,
        herbivores = req.herbivores,
        carnivores = req.carnivores,
        "Simulation start requested"
    );

    let population = Population::new(req.plants, req.herbivores, req.carnivores);
    let snapshot = state.ecosystem.lock().initialize(population)?;

    crate::record_counter!("simulations_started", 1);
    Ok(Json(snapshot))
}

/// Advance the world by exactly one tick
pub async fn next_iteration(State(state): State<AppState>) -> Result<Json<GridSnapshot>, ApiError> {
    let (snapshot, tick, census) = {
        let mut ecosystem = state.ecosystem.lock();
        let snapshot = ecosystem.advance()?;
        (snapshot, ecosystem.tick(), ecosystem.census())
    };

    crate::record_gauge!("population_living", census.living(), tick = tick);
    Ok(Json(snapshot))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub tick: u64,
    pub census: Census,
}

/// Get the current tick and population counts
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let ecosystem = state.ecosystem.lock();
    Json(StatsResponse {
        tick: ecosystem.tick(),
        census: ecosystem.census(),
    })
}

/// Get the simulation parameters in effect
pub async fn get_config(State(state): State<AppState>) -> Json<EcosystemConfig> {
    Json(state.ecosystem.lock().config().clone())
}

// Error handling
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<eco_core::Error> for ApiError {
    fn from(err: eco_core::Error) -> Self {
        match err {
            eco_core::Error::OverCapacity { requested, capacity } => {
                warn!(requested, capacity, "Rejected oversized population");
                ApiError::BadRequest("Too many entities".to_string())
            }
            other => {
                error!("Core error: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}
