//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tipo de vehículo - mapea al ENUM vehicle_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Sedan,
    Suv,
    Minivan,
    WheelchairVan,
    StretcherVan,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Sedan => "sedan",
            VehicleType::Suv => "suv",
            VehicleType::Minivan => "minivan",
            VehicleType::WheelchairVan => "wheelchair_van",
            VehicleType::StretcherVan => "stretcher_van",
        }
    }

    /// Acepta el alias legacy "stretcher" que todavía envía el formulario
    /// de solicitud antiguo.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "sedan" => Some(VehicleType::Sedan),
            "suv" => Some(VehicleType::Suv),
            "minivan" => Some(VehicleType::Minivan),
            "wheelchair_van" => Some(VehicleType::WheelchairVan),
            "stretcher_van" | "stretcher" => Some(VehicleType::StretcherVan),
            _ => None,
        }
    }
}

impl sqlx::postgres::PgHasArrayType for VehicleType {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_vehicle_type")
    }
}

/// Propiedad del vehículo - mapea al ENUM vehicle_ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_ownership", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleOwnership {
    Company,
    Driver,
}

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Active,
    Inactive,
    Retired,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub license_plate: String,
    pub license_state: Option<String>,
    pub vehicle_type: VehicleType,
    pub ownership: VehicleOwnership,
    pub owner_driver_id: Option<Uuid>,
    pub status: VehicleStatus,
    pub status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub make: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1990, max = 2030))]
    pub year: i32,

    #[validate(length(min = 2, max = 50))]
    pub color: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub license_plate: String,

    #[validate(length(min = 2, max = 2))]
    pub license_state: Option<String>,

    pub vehicle_type: VehicleType,

    pub ownership: VehicleOwnership,

    /// Requerido cuando ownership == driver
    pub owner_driver_id: Option<Uuid>,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1990, max = 2030))]
    pub year: Option<i32>,

    #[validate(length(min = 2, max = 50))]
    pub color: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub license_plate: Option<String>,

    pub vehicle_type: Option<VehicleType>,
}

/// Request para cambiar el estado del vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleStatusRequest {
    pub status: VehicleStatus,

    #[validate(length(max = 500))]
    pub status_reason: Option<String>,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub license_plate: String,
    pub vehicle_type: VehicleType,
    pub ownership: VehicleOwnership,
    pub owner_driver_id: Option<Uuid>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            company_id: vehicle.company_id,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            color: vehicle.color,
            license_plate: vehicle.license_plate,
            vehicle_type: vehicle.vehicle_type,
            ownership: vehicle.ownership,
            owner_driver_id: vehicle.owner_driver_id,
            status: vehicle.status,
            created_at: vehicle.created_at,
        }
    }
}
