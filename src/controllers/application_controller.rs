//! Controller de solicitudes de conductor
//!
//! El camino de escritura de confianza: valida en el servidor y escribe
//! usuario + conductor + vehículo + asignación en una única transacción.
//! Un fallo a mitad revierte todo; no quedan conductores huérfanos.

use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::dto::application_dto::{ApplicationSubmission, ApplicationSubmitted};
use crate::middleware::auth::AuthScope;
use crate::models::application::{DraftResponse, SaveDraftRequest};
use crate::models::assignment::AssignmentType;
use crate::models::driver::ApplicationStatus;
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::company_repository::CompanyRepository;
use crate::repositories::draft_repository::DraftRepository;
use crate::repositories::driver_repository::{DriverRepository, NewDriverApplication};
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::application_service::{self, ApplicationError, ValidApplication};
use crate::services::email_service::EmailService;
use crate::utils::errors::AppError;

pub struct ApplicationController {
    pool: PgPool,
    email: EmailService,
}

impl ApplicationController {
    pub fn new(pool: PgPool, email: EmailService) -> Self {
        Self { pool, email }
    }

    pub async fn submit(
        &self,
        scope: &AuthScope,
        payload: ApplicationSubmission,
    ) -> Result<ApplicationSubmitted, AppError> {
        let now = Utc::now();

        let company_id = payload
            .company_id
            .ok_or(ApplicationError::MissingField("companyId"))?;

        let email = scope
            .email
            .clone()
            .ok_or_else(|| AppError::Unauthorized("Token does not carry an email".to_string()))?;

        let company = CompanyRepository::new(self.pool.clone())
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

        if !company.accepts_applications() {
            return Err(AppError::Forbidden(
                "Company is not accepting applications".to_string(),
            ));
        }

        let driver_repo = DriverRepository::new(self.pool.clone());
        let existing = driver_repo
            .find_by_user_and_company(scope.actor_id, company_id)
            .await?;

        let valid = application_service::validate(&payload, existing.as_ref(), now)?;
        let application = new_application(scope.actor_id, &valid);

        // Todas las escrituras en una transacción: o entra la solicitud
        // completa o no entra nada
        let mut tx = self.pool.begin().await?;

        UserRepository::upsert_profile(
            &mut *tx,
            scope.actor_id,
            &email,
            &valid.personal_info.full_name,
            &valid.personal_info.phone,
            company_id,
        )
        .await?;

        let driver = match &existing {
            Some(previous) if previous.application_status == ApplicationStatus::Rejected => {
                DriverRepository::resubmit_application(&mut *tx, previous.id, &application, now)
                    .await?
            }
            Some(_) => {
                // validate ya rechazó duplicados; esto solo puede pasar si la
                // fila cambió entre la lectura y la transacción
                return Err(ApplicationError::DuplicateApplication.into());
            }
            None => DriverRepository::insert_application(&mut *tx, &application, now).await?,
        };

        if let Some(vehicle) = &valid.vehicle {
            let vehicle_row = VehicleRepository::insert_owned(
                &mut *tx,
                company_id,
                driver.id,
                &vehicle.make,
                &vehicle.model,
                vehicle.year,
                &vehicle.color,
                &vehicle.license_plate,
                &valid.license.state,
                vehicle.vehicle_type,
            )
            .await?;

            AssignmentRepository::insert(
                &mut *tx,
                driver.id,
                vehicle_row.id,
                company_id,
                AssignmentType::Owned,
                true,
                now,
                None,
                None,
            )
            .await?;
        }

        tx.commit().await?;

        // Limpieza y correo fuera de la transacción: la solicitud ya está
        // persistida, estos fallos no deben convertirla en un 500
        if let Err(e) = DraftRepository::new(self.pool.clone())
            .delete(scope.actor_id, company_id)
            .await
        {
            warn!(user_id = %scope.actor_id, "failed to delete application draft: {}", e);
        }

        self.email
            .send_application_received(&email, &valid.personal_info.full_name, &company.name)
            .await;

        Ok(ApplicationSubmitted {
            success: true,
            driver_id: driver.id,
        })
    }

    // ============ Drafts ============

    pub async fn get_draft(
        &self,
        scope: &AuthScope,
        company_id: Uuid,
    ) -> Result<Option<DraftResponse>, AppError> {
        let draft = DraftRepository::new(self.pool.clone())
            .find(scope.actor_id, company_id)
            .await?;

        Ok(draft.map(DraftResponse::from))
    }

    pub async fn save_draft(
        &self,
        scope: &AuthScope,
        request: SaveDraftRequest,
    ) -> Result<DraftResponse, AppError> {
        let draft = DraftRepository::new(self.pool.clone())
            .save(
                scope.actor_id,
                request.company_id,
                &request.form_data,
                request.current_step,
            )
            .await?;

        Ok(DraftResponse::from(draft))
    }

    pub async fn delete_draft(
        &self,
        scope: &AuthScope,
        company_id: Uuid,
    ) -> Result<(), AppError> {
        DraftRepository::new(self.pool.clone())
            .delete(scope.actor_id, company_id)
            .await
    }
}

fn new_application(user_id: Uuid, valid: &ValidApplication) -> NewDriverApplication {
    NewDriverApplication {
        user_id,
        company_id: valid.company_id,
        employment_type: valid.employment_type,
        date_of_birth: valid.date_of_birth,
        address_line1: valid.personal_info.address.line1.clone(),
        address_line2: valid.personal_info.address.line2.clone(),
        city: valid.personal_info.address.city.clone(),
        state: valid.personal_info.address.state.clone(),
        zip: valid.personal_info.address.zip.clone(),
        license_number: valid.license.number.clone(),
        license_state: valid.license.state.clone(),
        license_expiration: valid.license_expiration,
        license_front_url: valid.license.front_url.clone(),
        license_back_url: valid.license.back_url.clone(),
        experience_notes: valid.experience_notes.clone(),
        referral_source: valid.referral_source.clone(),
        eula_version: valid.eula_version.clone(),
    }
}
