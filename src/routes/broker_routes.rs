use axum::{
    extract::{Path, State},
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::broker_controller::{BrokerController, EligibilityResponse};
use crate::middleware::auth::AuthScope;
use crate::models::broker::{
    Broker, BrokerAssignment, BrokerRate, BrokerWithStatsResponse, CreateBrokerRequest,
    UpdateBrokerRatesRequest, UpdateBrokerStatusRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_broker_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brokers))
        .route("/", post(create_broker))
        .route("/available", get(list_available))
        .route("/:id/status", patch(update_status))
        .route("/:id/rates", get(current_rates))
        .route("/:id/rates", put(replace_rates))
        .route("/:id/eligibility/:driver_id", get(eligibility))
        .route("/:id/join", post(join))
        .route("/:id/request", post(request_assignment))
        .route("/assignments/:id/approve", post(approve_assignment))
        .route("/assignments/:id/deny", post(deny_assignment))
        .route("/assignments/:id/remove", post(remove_assignment))
}

#[derive(Debug, Deserialize)]
struct RemovalBody {
    reason: Option<String>,
}

async fn list_brokers(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
) -> Result<Json<Vec<BrokerWithStatsResponse>>, AppError> {
    let brokers = BrokerController::new(state.pool.clone())
        .list_with_stats(&scope)
        .await?;
    Ok(Json(brokers))
}

async fn list_available(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
) -> Result<Json<Vec<Broker>>, AppError> {
    let brokers = BrokerController::new(state.pool.clone())
        .list_for_driver(&scope)
        .await?;
    Ok(Json(brokers))
}

async fn create_broker(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Json(request): Json<CreateBrokerRequest>,
) -> Result<Json<Broker>, AppError> {
    request.validate()?;
    let broker = BrokerController::new(state.pool.clone())
        .create(&scope, request)
        .await?;
    Ok(Json(broker))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBrokerStatusRequest>,
) -> Result<Json<Broker>, AppError> {
    let broker = BrokerController::new(state.pool.clone())
        .update_status(&scope, id, request)
        .await?;
    Ok(Json(broker))
}

async fn current_rates(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BrokerRate>>, AppError> {
    let rates = BrokerController::new(state.pool.clone())
        .current_rates(&scope, id)
        .await?;
    Ok(Json(rates))
}

async fn replace_rates(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBrokerRatesRequest>,
) -> Result<Json<Vec<BrokerRate>>, AppError> {
    request.validate()?;
    let rates = BrokerController::new(state.pool.clone())
        .replace_rates(&scope, id, request)
        .await?;
    Ok(Json(rates))
}

async fn eligibility(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path((id, driver_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<EligibilityResponse>, AppError> {
    let report = BrokerController::new(state.pool.clone())
        .eligibility(&scope, id, driver_id)
        .await?;
    Ok(Json(report))
}

async fn join(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<BrokerAssignment>, AppError> {
    let assignment = BrokerController::new(state.pool.clone())
        .join(&scope, id)
        .await?;
    Ok(Json(assignment))
}

async fn request_assignment(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<BrokerAssignment>, AppError> {
    let assignment = BrokerController::new(state.pool.clone())
        .request_assignment(&scope, id)
        .await?;
    Ok(Json(assignment))
}

async fn approve_assignment(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<BrokerAssignment>, AppError> {
    let assignment = BrokerController::new(state.pool.clone())
        .approve_assignment(&scope, id)
        .await?;
    Ok(Json(assignment))
}

async fn deny_assignment(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(body): Json<RemovalBody>,
) -> Result<Json<BrokerAssignment>, AppError> {
    let assignment = BrokerController::new(state.pool.clone())
        .deny_assignment(&scope, id, body.reason)
        .await?;
    Ok(Json(assignment))
}

async fn remove_assignment(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(id): Path<Uuid>,
    Json(body): Json<RemovalBody>,
) -> Result<Json<BrokerAssignment>, AppError> {
    let assignment = BrokerController::new(state.pool.clone())
        .remove_assignment(&scope, id, body.reason)
        .await?;
    Ok(Json(assignment))
}
