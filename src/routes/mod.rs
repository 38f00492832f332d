//! Rutas de la API
//!
//! Cada dominio expone su propio router; aquí se ensamblan bajo /api.
//! Todos los routers requieren el AuthScope que inyecta el middleware JWT.

pub mod application_routes;
pub mod broker_routes;
pub mod company_routes;
pub mod credential_routes;
pub mod driver_routes;
pub mod profile_routes;
pub mod vehicle_routes;

use axum::Router;

use crate::state::AppState;

/// Crear el router principal de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/applications", application_routes::create_application_router())
        .nest("/brokers", broker_routes::create_broker_router())
        .nest("/companies", company_routes::create_company_router())
        .nest("/credentials", credential_routes::create_credential_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/me", profile_routes::create_profile_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
}
