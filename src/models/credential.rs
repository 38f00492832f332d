//! Modelos de credenciales
//!
//! CredentialType es la definición configurable de un requisito (documento,
//! firma, formulario...) con alcance global o por broker. CredentialRecord es
//! la instancia de envío de un sujeto (driver o vehicle) contra ese tipo.
//! El estado almacenado (CredentialStatus) es distinto del estado derivado
//! que ve el usuario (DisplayStatus), que depende del reloj.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::vehicle::VehicleType;

/// Categoría del tipo de credencial - mapea al ENUM credential_category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "credential_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CredentialCategory {
    Driver,
    Vehicle,
}

/// Alcance del tipo - mapea al ENUM credential_scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "credential_scope", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    Global,
    Broker,
}

/// Filtro por tipo de empleo - mapea al ENUM employment_filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "employment_filter")]
pub enum EmploymentFilter {
    #[sqlx(rename = "both")]
    #[serde(rename = "both")]
    Both,
    #[sqlx(rename = "w2_only")]
    #[serde(rename = "w2_only")]
    W2Only,
    #[sqlx(rename = "1099_only")]
    #[serde(rename = "1099_only")]
    C1099Only,
}

/// Nivel de exigencia - mapea al ENUM requirement_level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "requirement_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    Required,
    Recommended,
    Optional,
}

/// Tipo de envío - mapea al ENUM submission_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "submission_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    DocumentUpload,
    Photo,
    Signature,
    Form,
    DateEntry,
    AdminVerified,
}

/// Política de caducidad - mapea al ENUM expiration_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "expiration_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpirationType {
    Never,
    FixedInterval,
    DriverSpecified,
}

/// Estado almacenado de la instancia - mapea al ENUM credential_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "credential_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    NotSubmitted,
    PendingReview,
    Approved,
    Rejected,
    Expired,
}

/// Estado derivado que se muestra al usuario. A diferencia del estado
/// almacenado incorpora el reloj (expiring/expired) y la espera de
/// verificación administrativa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    NotSubmitted,
    PendingReview,
    AwaitingVerification,
    Approved,
    Rejected,
    Expiring,
    Expired,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::NotSubmitted => "not_submitted",
            DisplayStatus::PendingReview => "pending_review",
            DisplayStatus::AwaitingVerification => "awaiting_verification",
            DisplayStatus::Approved => "approved",
            DisplayStatus::Rejected => "rejected",
            DisplayStatus::Expiring => "expiring",
            DisplayStatus::Expired => "expired",
        }
    }
}

/// CredentialType principal - mapea exactamente a la tabla credential_types
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CredentialType {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: CredentialCategory,
    pub scope: CredentialScope,
    /// Obligatorio cuando scope == broker
    pub broker_id: Option<Uuid>,
    pub employment_type: EmploymentFilter,
    pub requirement: RequirementLevel,
    /// None o lista vacía = aplica a todos los tipos de vehículo
    pub vehicle_types: Option<Vec<VehicleType>>,
    pub submission_type: SubmissionType,
    pub expiration_type: ExpirationType,
    pub expiration_interval_days: Option<i32>,
    pub expiration_warning_days: i32,
    pub grace_period_days: i32,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

impl CredentialType {
    /// Credencial que no requiere acción del conductor; la verifica un admin.
    pub fn is_admin_verified(&self) -> bool {
        self.submission_type == SubmissionType::AdminVerified
    }
}

/// Tabla de instancias sobre la que opera una petición
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialTable {
    Driver,
    Vehicle,
}

impl CredentialTable {
    /// Nombre real de la tabla en PostgreSQL
    pub fn table_name(&self) -> &'static str {
        match self {
            CredentialTable::Driver => "driver_credentials",
            CredentialTable::Vehicle => "vehicle_credentials",
        }
    }

    /// Columna FK del sujeto en esa tabla
    pub fn subject_column(&self) -> &'static str {
        match self {
            CredentialTable::Driver => "driver_id",
            CredentialTable::Vehicle => "vehicle_id",
        }
    }
}

/// Instancia de credencial. Las tablas driver_credentials y
/// vehicle_credentials comparten columnas; el repositorio aliasa la FK del
/// sujeto como subject_id para usar un único struct.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub credential_type_id: Uuid,
    pub company_id: Uuid,
    pub status: CredentialStatus,
    pub document_urls: Option<Vec<String>>,
    pub signature_data: Option<serde_json::Value>,
    pub form_data: Option<serde_json::Value>,
    pub entered_date: Option<NaiveDate>,
    pub driver_expiration_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub review_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub submission_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un tipo de credencial
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCredentialTypeRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub category: CredentialCategory,
    pub scope: CredentialScope,
    pub broker_id: Option<Uuid>,
    pub employment_type: EmploymentFilter,
    pub requirement: RequirementLevel,
    pub vehicle_types: Option<Vec<VehicleType>>,
    pub submission_type: SubmissionType,
    pub expiration_type: ExpirationType,

    #[validate(range(min = 1, max = 3650))]
    pub expiration_interval_days: Option<i32>,

    #[serde(default = "default_warning_days")]
    #[validate(range(min = 0, max = 365))]
    pub expiration_warning_days: i32,

    #[serde(default)]
    #[validate(range(min = 0, max = 365))]
    pub grace_period_days: i32,

    #[serde(default)]
    pub display_order: i32,
}

fn default_warning_days() -> i32 {
    30
}

/// Request idempotente para garantizar que existe la instancia
#[derive(Debug, Deserialize)]
pub struct EnsureCredentialRequest {
    pub subject_id: Uuid,
    pub credential_type_id: Uuid,
}

/// Payload de envío, discriminado por el tipo de envío de la credencial
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialSubmission {
    Document {
        document_urls: Vec<String>,
        /// Fecha de caducidad declarada por el conductor
        /// (expiration_type == driver_specified)
        driver_expiration_date: Option<NaiveDate>,
        notes: Option<String>,
    },
    Photo {
        document_urls: Vec<String>,
        notes: Option<String>,
    },
    Signature {
        signature_data: serde_json::Value,
        notes: Option<String>,
    },
    Form {
        form_data: serde_json::Value,
        notes: Option<String>,
    },
    Date {
        entered_date: NaiveDate,
        notes: Option<String>,
    },
}

impl CredentialSubmission {
    /// El payload debe corresponder con el submission_type del tipo
    pub fn matches(&self, submission_type: SubmissionType) -> bool {
        matches!(
            (self, submission_type),
            (CredentialSubmission::Document { .. }, SubmissionType::DocumentUpload)
                | (CredentialSubmission::Photo { .. }, SubmissionType::Photo)
                | (CredentialSubmission::Signature { .. }, SubmissionType::Signature)
                | (CredentialSubmission::Form { .. }, SubmissionType::Form)
                | (CredentialSubmission::Date { .. }, SubmissionType::DateEntry)
        )
    }
}

/// Decisión de revisión de un admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    Verify,
}

/// Request de revisión de credencial
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewCredentialRequest {
    pub decision: ReviewDecision,

    /// Obligatorio (no vacío) cuando decision == reject
    #[validate(length(max = 1000))]
    pub reason: Option<String>,

    #[validate(length(max = 1000))]
    pub review_notes: Option<String>,
}

/// Una credencial resuelta para mostrar: instancia (o placeholder
/// not_submitted) + tipo + estado derivado
#[derive(Debug, Serialize)]
pub struct ResolvedCredentialResponse {
    pub credential_id: Option<Uuid>,
    pub credential_type: CredentialType,
    pub status: CredentialStatus,
    pub display_status: DisplayStatus,
    pub days_until_expiration: Option<i64>,
    pub is_expiring_soon: bool,
    pub can_submit: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Resumen de progreso sobre las credenciales requeridas
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CredentialProgressSummary {
    pub total: usize,
    pub complete: usize,
    pub pending: usize,
    pub action_needed: usize,
    pub percentage: u32,
}

/// Listado combinado: credenciales resueltas + resumen
#[derive(Debug, Serialize)]
pub struct CredentialListResponse {
    pub credentials: Vec<ResolvedCredentialResponse>,
    pub progress: CredentialProgressSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_matches_type() {
        let doc = CredentialSubmission::Document {
            document_urls: vec!["a/b.pdf".to_string()],
            driver_expiration_date: None,
            notes: None,
        };
        assert!(doc.matches(SubmissionType::DocumentUpload));
        assert!(!doc.matches(SubmissionType::Signature));
        assert!(!doc.matches(SubmissionType::AdminVerified));

        let date = CredentialSubmission::Date {
            entered_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            notes: None,
        };
        assert!(date.matches(SubmissionType::DateEntry));
        assert!(!date.matches(SubmissionType::Form));
    }

    #[test]
    fn test_employment_filter_wire_format() {
        assert_eq!(serde_json::to_string(&EmploymentFilter::C1099Only).unwrap(), "\"1099_only\"");
        let parsed: EmploymentFilter = serde_json::from_str("\"w2_only\"").unwrap();
        assert_eq!(parsed, EmploymentFilter::W2Only);
    }

    #[test]
    fn test_table_names() {
        assert_eq!(CredentialTable::Driver.table_name(), "driver_credentials");
        assert_eq!(CredentialTable::Vehicle.subject_column(), "vehicle_id");
    }
}
