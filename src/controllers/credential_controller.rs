//! Controller de credenciales
//!
//! Listado resuelto (tipos aplicables + instancias + estado derivado),
//! ensure idempotente, envío y revisión.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::AuthScope;
use crate::models::broker::BrokerAssignmentStatus;
use crate::models::credential::{
    CreateCredentialTypeRequest, CredentialCategory, CredentialListResponse, CredentialRecord,
    CredentialScope, CredentialStatus, CredentialSubmission, CredentialTable, CredentialType,
    EnsureCredentialRequest, ReviewCredentialRequest, ReviewDecision,
};
use crate::eligibility::Subject;
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::broker_repository::BrokerRepository;
use crate::repositories::credential_repository::{CredentialRepository, SubmissionWrite};
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::credential_service;
use crate::utils::errors::AppError;

pub struct CredentialController {
    pool: PgPool,
}

impl CredentialController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ============ Tipos ============

    pub async fn list_types(&self, scope: &AuthScope) -> Result<Vec<CredentialType>, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        CredentialRepository::new(self.pool.clone())
            .list_types_by_company(company_id)
            .await
    }

    pub async fn create_type(
        &self,
        scope: &AuthScope,
        request: CreateCredentialTypeRequest,
    ) -> Result<CredentialType, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        // Invariante: scope broker exige broker_id de la misma empresa
        match request.scope {
            CredentialScope::Broker => {
                let broker_id = request.broker_id.ok_or_else(|| {
                    AppError::BadRequest(
                        "broker_id is required for broker-scoped credential types".to_string(),
                    )
                })?;
                let broker = BrokerRepository::new(self.pool.clone())
                    .find_by_id(broker_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Broker not found".to_string()))?;
                scope.ensure_company(broker.company_id)?;
            }
            CredentialScope::Global => {
                if request.broker_id.is_some() {
                    return Err(AppError::BadRequest(
                        "Global credential types cannot reference a broker".to_string(),
                    ));
                }
            }
        }

        CredentialRepository::new(self.pool.clone())
            .create_type(company_id, &request, scope.actor_id)
            .await
    }

    // ============ Listados resueltos ============

    pub async fn list_for_subject(
        &self,
        scope: &AuthScope,
        table: CredentialTable,
        subject_id: Uuid,
    ) -> Result<CredentialListResponse, AppError> {
        match table {
            CredentialTable::Driver => self.list_driver_credentials(scope, subject_id).await,
            CredentialTable::Vehicle => self.list_vehicle_credentials(scope, subject_id).await,
        }
    }

    pub async fn list_driver_credentials(
        &self,
        scope: &AuthScope,
        driver_id: Uuid,
    ) -> Result<CredentialListResponse, AppError> {
        let driver = DriverRepository::new(self.pool.clone())
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
        scope.can_access_driver(driver.user_id, driver.company_id)?;

        let credential_repo = CredentialRepository::new(self.pool.clone());
        let types = credential_repo.list_types_by_company(driver.company_id).await?;
        let broker_ids = self.assigned_broker_ids(driver.id).await?;

        let subject = Subject::driver(driver.company_id, driver.employment_type);
        let applicable = credential_service::applicable_types(
            &types,
            CredentialCategory::Driver,
            &subject,
            &broker_ids,
        );
        let records = credential_repo
            .list_for_subject(CredentialTable::Driver, driver.id)
            .await?;

        let now = Utc::now();
        let credentials = credential_service::resolve_for_subject(&applicable, &records, now);
        let progress = credential_service::progress(&credentials);

        Ok(CredentialListResponse {
            credentials,
            progress,
        })
    }

    pub async fn list_vehicle_credentials(
        &self,
        scope: &AuthScope,
        vehicle_id: Uuid,
    ) -> Result<CredentialListResponse, AppError> {
        let vehicle = VehicleRepository::new(self.pool.clone())
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
        self.ensure_vehicle_access(scope, vehicle.company_id, vehicle_id).await?;

        let credential_repo = CredentialRepository::new(self.pool.clone());
        let types = credential_repo.list_types_by_company(vehicle.company_id).await?;

        // Alcance broker: los brokers del conductor actualmente asignado
        let broker_ids = match AssignmentRepository::new(self.pool.clone())
            .find_active_by_vehicle(vehicle_id)
            .await?
        {
            Some(assignment) => self.assigned_broker_ids(assignment.driver_id).await?,
            None => vec![],
        };

        let subject = Subject::vehicle(vehicle.company_id, vehicle.vehicle_type);
        let applicable = credential_service::applicable_types(
            &types,
            CredentialCategory::Vehicle,
            &subject,
            &broker_ids,
        );
        let records = credential_repo
            .list_for_subject(CredentialTable::Vehicle, vehicle_id)
            .await?;

        let now = Utc::now();
        let credentials = credential_service::resolve_for_subject(&applicable, &records, now);
        let progress = credential_service::progress(&credentials);

        Ok(CredentialListResponse {
            credentials,
            progress,
        })
    }

    // ============ Instancias ============

    pub async fn ensure(
        &self,
        scope: &AuthScope,
        table: CredentialTable,
        request: EnsureCredentialRequest,
    ) -> Result<Uuid, AppError> {
        let credential_repo = CredentialRepository::new(self.pool.clone());
        let credential_type = credential_repo
            .find_type(request.credential_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Credential type not found".to_string()))?;

        let expected_category = match table {
            CredentialTable::Driver => CredentialCategory::Driver,
            CredentialTable::Vehicle => CredentialCategory::Vehicle,
        };
        if credential_type.category != expected_category {
            return Err(AppError::BadRequest(
                "Credential type category does not match the subject".to_string(),
            ));
        }

        let company_id = match table {
            CredentialTable::Driver => {
                let driver = DriverRepository::new(self.pool.clone())
                    .find_by_id(request.subject_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
                scope.can_access_driver(driver.user_id, driver.company_id)?;
                driver.company_id
            }
            CredentialTable::Vehicle => {
                let vehicle = VehicleRepository::new(self.pool.clone())
                    .find_by_id(request.subject_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
                self.ensure_vehicle_access(scope, vehicle.company_id, vehicle.id).await?;
                vehicle.company_id
            }
        };

        if credential_type.company_id != company_id {
            return Err(AppError::Forbidden(
                "Credential type does not belong to this company".to_string(),
            ));
        }

        credential_repo
            .ensure(table, request.subject_id, request.credential_type_id, company_id)
            .await
    }

    pub async fn submit(
        &self,
        scope: &AuthScope,
        table: CredentialTable,
        credential_id: Uuid,
        submission: CredentialSubmission,
    ) -> Result<CredentialRecord, AppError> {
        let credential_repo = CredentialRepository::new(self.pool.clone());
        let record = credential_repo
            .find_record(table, credential_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Credential not found".to_string()))?;

        self.ensure_subject_access(scope, table, &record).await?;

        let credential_type = credential_repo
            .find_type(record.credential_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Credential type not found".to_string()))?;

        if credential_type.is_admin_verified() {
            return Err(AppError::BadRequest(
                "This credential is verified by an administrator".to_string(),
            ));
        }
        if record.status == CredentialStatus::PendingReview {
            return Err(AppError::Conflict(
                "Credential is already pending review".to_string(),
            ));
        }
        if !submission.matches(credential_type.submission_type) {
            return Err(AppError::BadRequest(
                "Submission payload does not match the credential type".to_string(),
            ));
        }

        let write = submission_write(submission);
        credential_repo
            .apply_submission(table, credential_id, &write, Utc::now())
            .await
    }

    pub async fn review(
        &self,
        scope: &AuthScope,
        table: CredentialTable,
        credential_id: Uuid,
        request: ReviewCredentialRequest,
    ) -> Result<CredentialRecord, AppError> {
        scope.require_staff()?;

        let credential_repo = CredentialRepository::new(self.pool.clone());
        let record = credential_repo
            .find_record(table, credential_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Credential not found".to_string()))?;
        scope.ensure_company(record.company_id)?;

        let credential_type = credential_repo
            .find_type(record.credential_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Credential type not found".to_string()))?;

        let now = Utc::now();
        match request.decision {
            ReviewDecision::Approve => {
                let expires_at =
                    credential_service::compute_expires_at(&credential_type, &record, now);
                credential_repo
                    .approve(
                        table,
                        credential_id,
                        scope.actor_id,
                        expires_at,
                        request.review_notes.as_deref(),
                        now,
                    )
                    .await
            }
            ReviewDecision::Verify => {
                // La verificación es el camino de aprobación de las
                // credenciales admin_verified
                if !credential_type.is_admin_verified() {
                    return Err(AppError::BadRequest(
                        "Only admin-verified credentials can be verified".to_string(),
                    ));
                }
                let expires_at =
                    credential_service::compute_expires_at(&credential_type, &record, now);
                credential_repo
                    .approve(
                        table,
                        credential_id,
                        scope.actor_id,
                        expires_at,
                        request.review_notes.as_deref(),
                        now,
                    )
                    .await
            }
            ReviewDecision::Reject => {
                // El rechazo siempre exige un motivo no vacío
                let reason = request
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        AppError::BadRequest("Rejection requires a reason".to_string())
                    })?;
                credential_repo
                    .reject(
                        table,
                        credential_id,
                        scope.actor_id,
                        reason,
                        request.review_notes.as_deref(),
                        now,
                    )
                    .await
            }
        }
    }

    // ============ Helpers ============

    async fn assigned_broker_ids(&self, driver_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let assignments = BrokerRepository::new(self.pool.clone())
            .list_assignments_by_driver(driver_id)
            .await?;

        Ok(assignments
            .into_iter()
            .filter(|a| a.status == BrokerAssignmentStatus::Assigned)
            .map(|a| a.broker_id)
            .collect())
    }

    /// Acceso al sujeto de la instancia: el propio conductor o staff de la
    /// empresa
    async fn ensure_subject_access(
        &self,
        scope: &AuthScope,
        table: CredentialTable,
        record: &CredentialRecord,
    ) -> Result<(), AppError> {
        match table {
            CredentialTable::Driver => {
                let driver = DriverRepository::new(self.pool.clone())
                    .find_by_id(record.subject_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
                scope.can_access_driver(driver.user_id, driver.company_id)
            }
            CredentialTable::Vehicle => {
                self.ensure_vehicle_access(scope, record.company_id, record.subject_id)
                    .await
            }
        }
    }

    /// Staff de la empresa, o el conductor con asignación activa sobre el
    /// vehículo (incluye propietario: su asignación owned está activa)
    async fn ensure_vehicle_access(
        &self,
        scope: &AuthScope,
        vehicle_company_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<(), AppError> {
        if scope.role.is_company_staff() {
            return scope.ensure_company(vehicle_company_id);
        }

        let driver = DriverRepository::new(self.pool.clone())
            .find_by_user_and_company(scope.actor_id, vehicle_company_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("No driver record for this company".to_string())
            })?;

        let assigned = AssignmentRepository::new(self.pool.clone())
            .list_active_by_driver(driver.id)
            .await?
            .iter()
            .any(|a| a.vehicle_id == vehicle_id);

        if assigned {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Drivers can only access vehicles assigned to them".to_string(),
            ))
        }
    }
}

fn submission_write(submission: CredentialSubmission) -> SubmissionWrite {
    match submission {
        CredentialSubmission::Document {
            document_urls,
            driver_expiration_date,
            notes,
        } => SubmissionWrite {
            document_urls: Some(document_urls),
            driver_expiration_date,
            notes,
            ..Default::default()
        },
        CredentialSubmission::Photo {
            document_urls,
            notes,
        } => SubmissionWrite {
            document_urls: Some(document_urls),
            notes,
            ..Default::default()
        },
        CredentialSubmission::Signature {
            signature_data,
            notes,
        } => SubmissionWrite {
            signature_data: Some(signature_data),
            notes,
            ..Default::default()
        },
        CredentialSubmission::Form { form_data, notes } => SubmissionWrite {
            form_data: Some(form_data),
            notes,
            ..Default::default()
        },
        CredentialSubmission::Date {
            entered_date,
            notes,
        } => SubmissionWrite {
            entered_date: Some(entered_date),
            notes,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_submission_write_maps_payload_columns() {
        let write = submission_write(CredentialSubmission::Document {
            document_urls: vec!["a/front.pdf".to_string()],
            driver_expiration_date: NaiveDate::from_ymd_opt(2027, 1, 1),
            notes: Some("renewed".to_string()),
        });
        assert_eq!(write.document_urls.as_deref(), Some(&["a/front.pdf".to_string()][..]));
        assert!(write.signature_data.is_none());
        assert!(write.form_data.is_none());
        assert_eq!(write.driver_expiration_date, NaiveDate::from_ymd_opt(2027, 1, 1));

        let write = submission_write(CredentialSubmission::Date {
            entered_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            notes: None,
        });
        assert_eq!(write.entered_date, NaiveDate::from_ymd_opt(2026, 9, 1));
        assert!(write.document_urls.is_none());
    }
}
