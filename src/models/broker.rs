//! Modelo de Broker (trip source)
//!
//! Un broker es una fuente externa de viajes con sus propias reglas de
//! elegibilidad: estados de servicio, tipos de empleo y tipos de vehículo
//! aceptados. Lista vacía = acepta todos (estados y tipos de empleo).

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::driver::EmploymentType;
use super::vehicle::VehicleType;

/// Estado del broker - mapea al ENUM broker_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "broker_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BrokerStatus {
    Active,
    Inactive,
}

/// Estado de la relación driver-broker - mapea al ENUM broker_assignment_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "broker_assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BrokerAssignmentStatus {
    Pending,
    Assigned,
    Removed,
}

/// Cómo puede un conductor unirse a este broker. Se deriva de la
/// configuración del broker y es independiente del booleano de elegibilidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    AutoSignup,
    Request,
    AdminOnly,
    NotEligible,
}

/// Broker principal - mapea exactamente a la tabla brokers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Broker {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub contract_number: Option<String>,
    pub notes: Option<String>,
    /// Lista vacía = todos los estados
    pub service_states: Vec<String>,
    pub accepted_vehicle_types: Vec<VehicleType>,
    /// Lista vacía = todos los tipos de empleo
    pub accepted_employment_types: Vec<EmploymentType>,
    pub allow_driver_requests: bool,
    pub allow_driver_auto_signup: bool,
    pub status: BrokerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Relación driver-broker - mapea a driver_broker_assignments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BrokerAssignment {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub broker_id: Uuid,
    pub company_id: Uuid,
    pub status: BrokerAssignmentStatus,
    pub requested_by: Option<Uuid>,
    pub requested_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removal_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tarifa por tipo de vehículo - mapea a broker_rates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BrokerRate {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub company_id: Uuid,
    pub vehicle_type: VehicleType,
    pub base_rate: Decimal,
    pub per_mile_rate: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Request para crear un broker
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrokerRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: String,

    #[validate(length(max = 50))]
    pub code: Option<String>,

    #[validate(email)]
    pub contact_email: Option<String>,

    #[validate(length(max = 100))]
    pub contact_name: Option<String>,

    #[validate(length(max = 30))]
    pub contact_phone: Option<String>,

    #[serde(default)]
    pub service_states: Vec<String>,

    #[serde(default)]
    pub accepted_vehicle_types: Vec<VehicleType>,

    #[serde(default)]
    pub accepted_employment_types: Vec<EmploymentType>,

    #[serde(default)]
    pub allow_driver_requests: bool,

    #[serde(default)]
    pub allow_driver_auto_signup: bool,
}

/// Request para cambiar el estado del broker
#[derive(Debug, Deserialize)]
pub struct UpdateBrokerStatusRequest {
    pub status: BrokerStatus,
}

/// Nueva tabla de tarifas (reemplaza la ventana vigente)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBrokerRatesRequest {
    pub effective_from: NaiveDate,

    #[validate(length(min = 1))]
    pub rates: Vec<BrokerRateEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BrokerRateEntry {
    pub vehicle_type: VehicleType,
    pub base_rate: Decimal,
    pub per_mile_rate: Decimal,
}

/// Response de broker con contadores para el dashboard
#[derive(Debug, Serialize)]
pub struct BrokerWithStatsResponse {
    #[serde(flatten)]
    pub broker: Broker,
    pub assigned_count: i64,
    pub pending_count: i64,
    pub credential_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_mode_serde_snake_case() {
        assert_eq!(serde_json::to_string(&JoinMode::AutoSignup).unwrap(), "\"auto_signup\"");
        assert_eq!(serde_json::to_string(&JoinMode::NotEligible).unwrap(), "\"not_eligible\"");
    }
}
