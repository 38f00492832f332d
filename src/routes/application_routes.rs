use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::application_controller::ApplicationController;
use crate::dto::application_dto::{ApplicationSubmission, ApplicationSubmitted};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthScope;
use crate::models::application::{DraftResponse, SaveDraftRequest};
use crate::services::email_service::EmailService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_application_router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_application))
        .route("/draft", put(save_draft))
        .route("/draft/:company_id", get(get_draft))
        .route("/draft/:company_id", delete(delete_draft))
}

fn controller(state: &AppState) -> ApplicationController {
    let email = EmailService::new(&state.config, state.http_client.clone());
    ApplicationController::new(state.pool.clone(), email)
}

async fn submit_application(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Json(payload): Json<ApplicationSubmission>,
) -> Result<Json<ApplicationSubmitted>, AppError> {
    let response = controller(&state).submit(&scope, payload).await?;
    Ok(Json(response))
}

async fn get_draft(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<Option<DraftResponse>>, AppError> {
    let draft = controller(&state).get_draft(&scope, company_id).await?;
    Ok(Json(draft))
}

async fn save_draft(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Json(request): Json<SaveDraftRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    request.validate()?;
    let draft = controller(&state).save_draft(&scope, request).await?;
    Ok(Json(draft))
}

async fn delete_draft(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    controller(&state).delete_draft(&scope, company_id).await?;
    Ok(Json(ApiResponse::success(())))
}
