//! Controller de conductores
//!
//! Listado por empresa y revisión de solicitudes desde el dashboard admin.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::AuthScope;
use crate::models::driver::{
    ApplicationDecision, ApplicationStatus, Driver, DriverResponse, ReviewApplicationRequest,
    UpdateDriverStatusRequest,
};
use crate::repositories::driver_repository::DriverRepository;
use crate::utils::errors::AppError;

pub struct DriverController {
    pool: PgPool,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: &AuthScope) -> Result<Vec<DriverResponse>, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        let drivers = DriverRepository::new(self.pool.clone())
            .list_by_company(company_id)
            .await?;

        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    pub async fn get(&self, scope: &AuthScope, driver_id: Uuid) -> Result<DriverResponse, AppError> {
        let driver = self.load(driver_id).await?;
        scope.can_access_driver(driver.user_id, driver.company_id)?;

        Ok(DriverResponse::from(driver))
    }

    /// Marca la solicitud como en revisión cuando el admin la abre
    pub async fn start_review(
        &self,
        scope: &AuthScope,
        driver_id: Uuid,
    ) -> Result<DriverResponse, AppError> {
        scope.require_staff()?;
        let driver = self.load(driver_id).await?;
        scope.ensure_company(driver.company_id)?;

        if driver.application_status != ApplicationStatus::Pending {
            return Err(AppError::Conflict(
                "Only pending applications can move to review".to_string(),
            ));
        }

        let updated = DriverRepository::new(self.pool.clone())
            .set_under_review(driver_id)
            .await?;
        Ok(DriverResponse::from(updated))
    }

    pub async fn review_application(
        &self,
        scope: &AuthScope,
        driver_id: Uuid,
        request: ReviewApplicationRequest,
    ) -> Result<DriverResponse, AppError> {
        scope.require_staff()?;
        let driver = self.load(driver_id).await?;
        scope.ensure_company(driver.company_id)?;

        if !matches!(
            driver.application_status,
            ApplicationStatus::Pending | ApplicationStatus::UnderReview
        ) {
            return Err(AppError::Conflict(
                "Application has already been decided".to_string(),
            ));
        }

        let repo = DriverRepository::new(self.pool.clone());
        let updated = match request.decision {
            ApplicationDecision::Approved => {
                repo.approve_application(driver_id, scope.actor_id).await?
            }
            ApplicationDecision::Rejected => {
                // El rechazo siempre exige un motivo no vacío
                let reason = request
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        AppError::BadRequest("Rejection requires a reason".to_string())
                    })?;

                let now = Utc::now();
                let can_reapply_at = request
                    .reapply_after_days
                    .map(|days| now + Duration::days(days));

                repo.reject_application(driver_id, reason, can_reapply_at, now)
                    .await?
            }
        };

        Ok(DriverResponse::from(updated))
    }

    pub async fn update_status(
        &self,
        scope: &AuthScope,
        driver_id: Uuid,
        request: UpdateDriverStatusRequest,
    ) -> Result<DriverResponse, AppError> {
        scope.require_staff()?;
        let driver = self.load(driver_id).await?;
        scope.ensure_company(driver.company_id)?;

        if driver.application_status != ApplicationStatus::Approved {
            return Err(AppError::Conflict(
                "Driver must have an approved application".to_string(),
            ));
        }

        let updated = DriverRepository::new(self.pool.clone())
            .update_status(driver_id, request.status)
            .await?;
        Ok(DriverResponse::from(updated))
    }

    async fn load(&self, driver_id: Uuid) -> Result<Driver, AppError> {
        DriverRepository::new(self.pool.clone())
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))
    }
}
