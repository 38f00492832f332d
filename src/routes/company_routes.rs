use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::models::company::CompanyResponse;
use crate::repositories::company_repository::CompanyRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub fn create_company_router() -> Router<AppState> {
    Router::new().route("/:id", get(get_company))
}

/// Branding de la empresa para el formulario de solicitud. Lectura sin
/// lógica de negocio, no pasa por controller.
async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyResponse>, AppError> {
    let company = CompanyRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Company", &id.to_string()))?;

    Ok(Json(CompanyResponse::from(company)))
}
