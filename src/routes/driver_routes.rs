use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::driver_controller::DriverController;
use crate::middleware::auth::AuthScope;
use crate::models::driver::{
    DriverResponse, ReviewApplicationRequest, UpdateDriverStatusRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers))
        .route("/:id", get(get_driver))
        .route("/:id/start-review", post(start_review))
        .route("/:id/review", post(review_application))
        .route("/:id/status", patch(update_status))
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let drivers = DriverController::new(state.pool.clone()).list(&scope).await?;
    Ok(Json(drivers))
}

async fn get_driver(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = DriverController::new(state.pool.clone()).get(&scope, id).await?;
    Ok(Json(driver))
}

async fn start_review(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = DriverController::new(state.pool.clone())
        .start_review(&scope, id)
        .await?;
    Ok(Json(driver))
}

async fn review_application(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewApplicationRequest>,
) -> Result<Json<DriverResponse>, AppError> {
    request.validate()?;
    let driver = DriverController::new(state.pool.clone())
        .review_application(&scope, id, request)
        .await?;
    Ok(Json(driver))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverStatusRequest>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = DriverController::new(state.pool.clone())
        .update_status(&scope, id, request)
        .await?;
    Ok(Json(driver))
}
