use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::credential_controller::CredentialController;
use crate::middleware::auth::AuthScope;
use crate::models::credential::{
    CreateCredentialTypeRequest, CredentialListResponse, CredentialRecord, CredentialSubmission,
    CredentialTable, CredentialType, EnsureCredentialRequest, ReviewCredentialRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_credential_router() -> Router<AppState> {
    Router::new()
        .route("/types", get(list_types))
        .route("/types", post(create_type))
        .route("/:table/subject/:subject_id", get(list_subject_credentials))
        .route("/:table/ensure", post(ensure_credential))
        .route("/:table/:id/submit", post(submit_credential))
        .route("/:table/:id/review", post(review_credential))
}

async fn list_types(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
) -> Result<Json<Vec<CredentialType>>, AppError> {
    let types = CredentialController::new(state.pool.clone())
        .list_types(&scope)
        .await?;
    Ok(Json(types))
}

async fn create_type(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Json(request): Json<CreateCredentialTypeRequest>,
) -> Result<Json<CredentialType>, AppError> {
    request.validate()?;
    let credential_type = CredentialController::new(state.pool.clone())
        .create_type(&scope, request)
        .await?;
    Ok(Json(credential_type))
}

async fn list_subject_credentials(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path((table, subject_id)): Path<(CredentialTable, Uuid)>,
) -> Result<Json<CredentialListResponse>, AppError> {
    let response = CredentialController::new(state.pool.clone())
        .list_for_subject(&scope, table, subject_id)
        .await?;
    Ok(Json(response))
}

async fn ensure_credential(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(table): Path<CredentialTable>,
    Json(request): Json<EnsureCredentialRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = CredentialController::new(state.pool.clone())
        .ensure(&scope, table, request)
        .await?;
    Ok(Json(json!({ "id": id })))
}

async fn submit_credential(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path((table, id)): Path<(CredentialTable, Uuid)>,
    Json(submission): Json<CredentialSubmission>,
) -> Result<Json<CredentialRecord>, AppError> {
    let record = CredentialController::new(state.pool.clone())
        .submit(&scope, table, id, submission)
        .await?;
    Ok(Json(record))
}

async fn review_credential(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path((table, id)): Path<(CredentialTable, Uuid)>,
    Json(request): Json<ReviewCredentialRequest>,
) -> Result<Json<CredentialRecord>, AppError> {
    request.validate()?;
    let record = CredentialController::new(state.pool.clone())
        .review(&scope, table, id, request)
        .await?;
    Ok(Json(record))
}
