mod config;
mod controllers;
mod database;
mod dto;
mod eligibility;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use middleware::auth::auth_middleware;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "driver_credentialing=debug,tower_http=info".into()),
        )
        .init();

    info!("🚐 Driver Credentialing & Onboarding API");
    info!("========================================");

    let env_config = EnvironmentConfig::from_env();

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => {
            info!("✅ PostgreSQL conectado exitosamente");
            pool
        }
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let addr: SocketAddr = format!("{}:{}", env_config.host, env_config.port).parse()?;

    // CORS: orígenes explícitos en producción, permisivo en desarrollo
    let cors = if env_config.is_production() && !env_config.cors_origins.is_empty() {
        cors_middleware_with_origins(env_config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    let app_state = AppState::new(pool, env_config);

    // Rutas de la API: todas detrás del middleware JWT
    let api_router = routes::create_api_router().route_layer(
        axum::middleware::from_fn_with_state(app_state.clone(), auth_middleware),
    );

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📋 Solicitudes:");
    info!("   POST /api/applications - Enviar solicitud de conductor");
    info!("   PUT  /api/applications/draft - Autosave del formulario");
    info!("🪪 Credenciales:");
    info!("   GET  /api/credentials/types - Tipos configurados");
    info!("   GET  /api/credentials/:table/subject/:id - Credenciales resueltas del sujeto");
    info!("   POST /api/credentials/:table/ensure - Garantizar instancia");
    info!("   POST /api/credentials/:table/:id/submit - Enviar credencial");
    info!("   POST /api/credentials/:table/:id/review - Revisar credencial");
    info!("🚖 Trip sources:");
    info!("   GET  /api/brokers - Listado con contadores (admin)");
    info!("   GET  /api/brokers/:id/eligibility/:driver_id - Informe de elegibilidad");
    info!("   POST /api/brokers/:id/join - Auto-alta del conductor");
    info!("   POST /api/brokers/:id/request - Solicitud de unión");
    info!("🧑 Conductores:");
    info!("   GET  /api/drivers - Listado por empresa");
    info!("   POST /api/drivers/:id/review - Revisar solicitud");
    info!("🚗 Vehículos:");
    info!("   POST /api/vehicles - Crear vehículo");
    info!("   POST /api/vehicles/assignments - Asignar vehículo a conductor");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check del servicio
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "driver-credentialing",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
