use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::middleware::auth::AuthScope;
use crate::models::user::UserResponse;
use crate::repositories::user_repository::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub fn create_profile_router() -> Router<AppState> {
    Router::new().route("/", get(get_me))
}

/// Perfil del usuario autenticado
async fn get_me(
    State(state): State<AppState>,
    Extension(scope): Extension<AuthScope>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(scope.actor_id)
        .await?
        .ok_or_else(|| not_found_error("User", &scope.actor_id.to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
