use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    /// Number of concurrent simulated shoppers
    #[serde(default = "default_users")]
    pub users: u32,

    /// How long the simulation runs (seconds)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,
}

fn default_users() -> u32 {
    10
}
fn default_duration() -> u64 {
    60
}

#[derive(Debug, Serialize)]
pub struct SimulationStatus {
    pub running: bool,
    pub message: String,
}

// ─── POST /api/simulate/start ────────────────────────────────────

pub async fn start_simulation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationStatus>, AppError> {
    let limits = &state.config.simulator;

    // Validate inputs
    if request.users == 0 || request.users > limits.max_users {
        return Err(AppError::BadRequest(format!(
            "users must be between 1 and {}",
            limits.max_users
        )));
    }
    if request.duration_secs == 0 || request.duration_secs > limits.max_duration_secs {
        return Err(AppError::BadRequest(format!(
            "duration_secs must be between 1 and {}",
            limits.max_duration_secs
        )));
    }

    // Guard: only one simulation at a time
    if state
        .sim_running
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(AppError::Conflict("simulation already running".into()));
    }

    let message = format!(
        "Started: {} shoppers × {}s",
        request.users, request.duration_secs
    );
    tracing::info!(
        users = request.users,
        duration_secs = request.duration_secs,
        "starting traffic simulation"
    );

    // Simulated shoppers go through a full router so the timing middleware
    // sees their requests.
    let app = crate::server::create_router(state.clone());
    let running = state.sim_running.clone();

    let handle = tokio::spawn(crate::load_generator::run(
        running,
        app,
        request.users,
        request.duration_secs,
    ));

    // Stash the handle so `stop` can await clean shutdown
    *state.sim_handle.lock().await = Some(handle);

    Ok(Json(SimulationStatus {
        running: true,
        message,
    }))
}

// ─── POST /api/simulate/stop ─────────────────────────────────────

pub async fn stop_simulation(State(state): State<Arc<AppState>>) -> Json<SimulationStatus> {
    if !state.sim_running.load(Ordering::SeqCst) {
        return Json(SimulationStatus {
            running: false,
            message: "No simulation is running".into(),
        });
    }

    // Signal all shoppers to stop
    state.sim_running.store(false, Ordering::SeqCst);

    // Await the simulation task so we know it's fully stopped
    let handle = state.sim_handle.lock().await.take();
    if let Some(handle) = handle {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "simulation task ended abnormally");
        }
    }

    Json(SimulationStatus {
        running: false,
        message: "Simulation stopped".into(),
    })
}

// ─── GET /api/simulate/status ────────────────────────────────────

pub async fn simulation_status(State(state): State<Arc<AppState>>) -> Json<SimulationStatus> {
    let running = state.sim_running.load(Ordering::SeqCst);
    Json(SimulationStatus {
        running,
        message: if running {
            "Simulation in progress".into()
        } else {
            "Idle".into()
        },
    })
}
