//! Modelo de VehicleAssignment
//!
//! Vincula Driver y Vehicle. Invariante de aplicación: exactamente una
//! asignación primaria por conductor entre sus asignaciones activas; la
//! degradación de la primaria anterior ocurre en la misma transacción.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tipo de asignación - mapea al ENUM assignment_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "assignment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    Assigned,
    Borrowed,
    Owned,
}

/// VehicleAssignment principal - mapea a driver_vehicle_assignments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleAssignment {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub company_id: Uuid,
    pub assignment_type: AssignmentType,
    pub is_primary: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<Uuid>,
    pub end_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleAssignment {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Request para asignar un vehículo a un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct AssignVehicleRequest {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub assignment_type: AssignmentType,
    pub is_primary: bool,
    pub starts_at: Option<DateTime<Utc>>,

    /// Obligatorio (y posterior a starts_at) cuando assignment_type == borrowed
    pub ends_at: Option<DateTime<Utc>>,
}

/// Request para finalizar una asignación
#[derive(Debug, Deserialize, Validate)]
pub struct EndAssignmentRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Response de asignación para la API
#[derive(Debug, Serialize)]
pub struct VehicleAssignmentResponse {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub assignment_type: AssignmentType,
    pub is_primary: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<VehicleAssignment> for VehicleAssignmentResponse {
    fn from(assignment: VehicleAssignment) -> Self {
        Self {
            id: assignment.id,
            driver_id: assignment.driver_id,
            vehicle_id: assignment.vehicle_id,
            assignment_type: assignment.assignment_type,
            is_primary: assignment.is_primary,
            starts_at: assignment.starts_at,
            ends_at: assignment.ends_at,
            ended_at: assignment.ended_at,
        }
    }
}
