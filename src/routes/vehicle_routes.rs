use axum::{
    extract::{Path, State},
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::vehicle_controller::VehicleController;
use crate::middleware::auth::AuthScope;
use crate::models::assignment::{
    AssignVehicleRequest, EndAssignmentRequest, VehicleAssignmentResponse,
};
use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, UpdateVehicleStatusRequest, VehicleResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id/status", patch(update_status))
        .route("/driver/:driver_id", get(list_for_driver))
        .route("/assignments", post(assign_vehicle))
        .route("/assignments/:id/end", post(end_assignment))
        .route("/assignments/driver/:driver_id", get(list_driver_assignments))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    request.validate()?;
    let vehicle = VehicleController::new(state.pool.clone())
        .create(&scope, request)
        .await?;
    Ok(Json(vehicle))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let vehicles = VehicleController::new(state.pool.clone()).list(&scope).await?;
    Ok(Json(vehicles))
}

async fn list_for_driver(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let vehicles = VehicleController::new(state.pool.clone())
        .list_for_driver(&scope, driver_id)
        .await?;
    Ok(Json(vehicles))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let vehicle = VehicleController::new(state.pool.clone()).get(&scope, id).await?;
    Ok(Json(vehicle))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    request.validate()?;
    let vehicle = VehicleController::new(state.pool.clone())
        .update(&scope, id, request)
        .await?;
    Ok(Json(vehicle))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleStatusRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    request.validate()?;
    let vehicle = VehicleController::new(state.pool.clone())
        .update_status(&scope, id, request)
        .await?;
    Ok(Json(vehicle))
}

async fn assign_vehicle(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Json(request): Json<AssignVehicleRequest>,
) -> Result<Json<VehicleAssignmentResponse>, AppError> {
    request.validate()?;
    let assignment = VehicleController::new(state.pool.clone())
        .assign(&scope, request)
        .await?;
    Ok(Json(assignment))
}

async fn end_assignment(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<EndAssignmentRequest>,
) -> Result<Json<VehicleAssignmentResponse>, AppError> {
    request.validate()?;
    let assignment = VehicleController::new(state.pool.clone())
        .end_assignment(&scope, id, request)
        .await?;
    Ok(Json(assignment))
}

async fn list_driver_assignments(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<Vec<VehicleAssignmentResponse>>, AppError> {
    let assignments = VehicleController::new(state.pool.clone())
        .list_driver_assignments(&scope, driver_id)
        .await?;
    Ok(Json(assignments))
}
