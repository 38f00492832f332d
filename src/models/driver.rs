//! Modelo de Driver
//!
//! Este módulo contiene el struct Driver y el ciclo de vida de la solicitud
//! (pending -> under_review -> approved/rejected). El employment_type es
//! inmutable después de la aprobación y gobierna qué credenciales aplican.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Clasificación laboral del conductor - mapea al ENUM employment_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "employment_type")]
pub enum EmploymentType {
    #[sqlx(rename = "w2")]
    #[serde(rename = "w2")]
    W2,
    #[sqlx(rename = "1099")]
    #[serde(rename = "1099")]
    C1099,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::W2 => "w2",
            EmploymentType::C1099 => "1099",
        }
    }
}

impl sqlx::postgres::PgHasArrayType for EmploymentType {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_employment_type")
    }
}

/// Estado de la solicitud - mapea al ENUM application_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Withdrawn,
}

/// Estado operativo del conductor - mapea al ENUM driver_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Active,
    Inactive,
}

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub employment_type: EmploymentType,
    pub application_status: ApplicationStatus,
    pub status: DriverStatus,
    pub date_of_birth: NaiveDate,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub license_number: String,
    pub license_state: String,
    pub license_expiration: NaiveDate,
    pub license_front_url: Option<String>,
    pub license_back_url: Option<String>,
    pub experience_notes: Option<String>,
    pub referral_source: Option<String>,
    pub application_date: Option<DateTime<Utc>>,
    pub application_submitted_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub can_reapply_at: Option<DateTime<Utc>>,
    pub eula_accepted_at: Option<DateTime<Utc>>,
    pub eula_version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Una solicitud existente bloquea el reenvío salvo que haya sido
    /// rechazada y el plazo de can_reapply_at ya haya vencido.
    pub fn blocks_resubmission(&self, now: DateTime<Utc>) -> bool {
        if self.application_status != ApplicationStatus::Rejected {
            return true;
        }
        match self.can_reapply_at {
            Some(reapply_at) => reapply_at > now,
            None => false,
        }
    }
}

/// Request de revisión de solicitud (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewApplicationRequest {
    pub decision: ApplicationDecision,

    /// Obligatorio cuando decision == rejected
    #[validate(length(max = 1000))]
    pub reason: Option<String>,

    /// Días de espera antes de poder re-aplicar (solo rechazos)
    #[validate(range(min = 0, max = 365))]
    pub reapply_after_days: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationDecision {
    Approved,
    Rejected,
}

/// Request para cambiar el estado operativo
#[derive(Debug, Deserialize)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,
}

/// Response de conductor para la API
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub employment_type: EmploymentType,
    pub application_status: ApplicationStatus,
    pub status: DriverStatus,
    pub city: String,
    pub state: String,
    pub license_state: String,
    pub license_expiration: NaiveDate,
    pub application_submitted_at: Option<DateTime<Utc>>,
    pub can_reapply_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            user_id: driver.user_id,
            company_id: driver.company_id,
            employment_type: driver.employment_type,
            application_status: driver.application_status,
            status: driver.status,
            city: driver.city,
            state: driver.state,
            license_state: driver.license_state,
            license_expiration: driver.license_expiration,
            application_submitted_at: driver.application_submitted_at,
            can_reapply_at: driver.can_reapply_at,
            created_at: driver.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_driver(status: ApplicationStatus) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            employment_type: EmploymentType::W2,
            application_status: status,
            status: DriverStatus::Inactive,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 12).unwrap(),
            address_line1: "1 Main St".to_string(),
            address_line2: None,
            city: "Columbus".to_string(),
            state: "OH".to_string(),
            zip: "43004".to_string(),
            license_number: "L1234567".to_string(),
            license_state: "OH".to_string(),
            license_expiration: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            license_front_url: None,
            license_back_url: None,
            experience_notes: None,
            referral_source: None,
            application_date: None,
            application_submitted_at: None,
            rejection_reason: None,
            rejected_at: None,
            can_reapply_at: None,
            eula_accepted_at: None,
            eula_version: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_application_blocks_resubmission() {
        let driver = sample_driver(ApplicationStatus::Pending);
        assert!(driver.blocks_resubmission(Utc::now()));
    }

    #[test]
    fn test_approved_application_blocks_resubmission() {
        let driver = sample_driver(ApplicationStatus::Approved);
        assert!(driver.blocks_resubmission(Utc::now()));
    }

    #[test]
    fn test_rejected_with_future_reapply_blocks() {
        let now = Utc::now();
        let mut driver = sample_driver(ApplicationStatus::Rejected);
        driver.can_reapply_at = Some(now + Duration::days(10));
        assert!(driver.blocks_resubmission(now));
    }

    #[test]
    fn test_rejected_with_elapsed_reapply_allows() {
        let now = Utc::now();
        let mut driver = sample_driver(ApplicationStatus::Rejected);
        driver.can_reapply_at = Some(now - Duration::days(1));
        assert!(!driver.blocks_resubmission(now));
    }

    #[test]
    fn test_rejected_without_reapply_date_allows() {
        let driver = sample_driver(ApplicationStatus::Rejected);
        assert!(!driver.blocks_resubmission(Utc::now()));
    }

    #[test]
    fn test_employment_type_wire_format() {
        assert_eq!(serde_json::to_string(&EmploymentType::W2).unwrap(), "\"w2\"");
        assert_eq!(serde_json::to_string(&EmploymentType::C1099).unwrap(), "\"1099\"");
        let parsed: EmploymentType = serde_json::from_str("\"1099\"").unwrap();
        assert_eq!(parsed, EmploymentType::C1099);
    }
}
