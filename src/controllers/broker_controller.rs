//! Controller de brokers (trip sources)
//!
//! CRUD del catálogo, tarifas, y el flujo de unión de conductores:
//! evaluación de elegibilidad, auto-alta, solicitud y revisión del admin.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::eligibility::{self, InstanceState, VehicleCandidate};
use crate::middleware::auth::AuthScope;
use crate::models::broker::{
    Broker, BrokerAssignment, BrokerAssignmentStatus, BrokerRate, BrokerWithStatsResponse,
    CreateBrokerRequest, JoinMode, UpdateBrokerRatesRequest, UpdateBrokerStatusRequest,
};
use crate::models::credential::CredentialTable;
use crate::models::driver::Driver;
use crate::repositories::broker_repository::BrokerRepository;
use crate::repositories::credential_repository::CredentialRepository;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, validation_error, AppError};
use crate::utils::validation::{validate_positive, validate_state_code};

/// Veredicto de elegibilidad expuesto por la API
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub join_mode: JoinMode,
    pub reasons: Vec<String>,
}

pub struct BrokerController {
    pool: PgPool,
}

impl BrokerController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ============ Catálogo ============

    pub async fn list_with_stats(
        &self,
        scope: &AuthScope,
    ) -> Result<Vec<BrokerWithStatsResponse>, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        let repo = BrokerRepository::new(self.pool.clone());
        let brokers = repo.list_by_company(company_id).await?;
        let counts = repo.counts_by_company(company_id).await?;
        let counts_by_id: HashMap<Uuid, _> =
            counts.into_iter().map(|c| (c.broker_id, c)).collect();

        Ok(brokers
            .into_iter()
            .map(|broker| {
                let counts = counts_by_id.get(&broker.id);
                BrokerWithStatsResponse {
                    assigned_count: counts.map(|c| c.assigned_count).unwrap_or(0),
                    pending_count: counts.map(|c| c.pending_count).unwrap_or(0),
                    credential_count: counts.map(|c| c.credential_count).unwrap_or(0),
                    broker,
                }
            })
            .collect())
    }

    pub async fn list_for_driver(&self, scope: &AuthScope) -> Result<Vec<Broker>, AppError> {
        let company_id = scope.require_company()?;
        BrokerRepository::new(self.pool.clone())
            .list_by_company(company_id)
            .await
    }

    pub async fn create(
        &self,
        scope: &AuthScope,
        request: CreateBrokerRequest,
    ) -> Result<Broker, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        for state_code in &request.service_states {
            validate_state_code(state_code).map_err(|e| validation_error("service_states", e))?;
        }

        BrokerRepository::new(self.pool.clone())
            .create(company_id, &request, scope.actor_id)
            .await
    }

    pub async fn update_status(
        &self,
        scope: &AuthScope,
        broker_id: Uuid,
        request: UpdateBrokerStatusRequest,
    ) -> Result<Broker, AppError> {
        scope.require_staff()?;
        let broker = self.load_broker(broker_id).await?;
        scope.ensure_company(broker.company_id)?;

        BrokerRepository::new(self.pool.clone())
            .update_status(broker_id, request.status)
            .await
    }

    // ============ Tarifas ============

    pub async fn current_rates(
        &self,
        scope: &AuthScope,
        broker_id: Uuid,
    ) -> Result<Vec<BrokerRate>, AppError> {
        let broker = self.load_broker(broker_id).await?;
        scope.ensure_company(broker.company_id)?;

        BrokerRepository::new(self.pool.clone())
            .current_rates(broker_id)
            .await
    }

    pub async fn replace_rates(
        &self,
        scope: &AuthScope,
        broker_id: Uuid,
        request: UpdateBrokerRatesRequest,
    ) -> Result<Vec<BrokerRate>, AppError> {
        scope.require_staff()?;
        let broker = self.load_broker(broker_id).await?;
        scope.ensure_company(broker.company_id)?;

        for rate in &request.rates {
            validate_positive(rate.base_rate).map_err(|e| validation_error("base_rate", e))?;
            validate_positive(rate.per_mile_rate)
                .map_err(|e| validation_error("per_mile_rate", e))?;
        }

        BrokerRepository::new(self.pool.clone())
            .replace_rates(broker_id, broker.company_id, &request, scope.actor_id)
            .await
    }

    // ============ Elegibilidad y unión ============

    pub async fn eligibility(
        &self,
        scope: &AuthScope,
        broker_id: Uuid,
        driver_id: Uuid,
    ) -> Result<EligibilityResponse, AppError> {
        let broker = self.load_broker(broker_id).await?;
        let driver = self.load_driver(driver_id).await?;
        scope.can_access_driver(driver.user_id, driver.company_id)?;

        if broker.company_id != driver.company_id {
            return Err(AppError::BadRequest(
                "Driver and trip source belong to different companies".to_string(),
            ));
        }

        self.evaluate(&broker, &driver).await
    }

    /// Auto-alta del conductor: requiere elegibilidad completa y que el
    /// broker permita auto_signup
    pub async fn join(
        &self,
        scope: &AuthScope,
        broker_id: Uuid,
    ) -> Result<BrokerAssignment, AppError> {
        let broker = self.load_broker(broker_id).await?;
        let driver = self.driver_for_actor(scope, broker.company_id).await?;

        self.ensure_no_active_assignment(driver.id, broker_id).await?;

        let report = self.evaluate(&broker, &driver).await?;
        if report.join_mode != JoinMode::AutoSignup {
            return Err(AppError::Forbidden(
                "This trip source does not allow self sign-up".to_string(),
            ));
        }
        if !report.eligible {
            return Err(AppError::Forbidden(format!(
                "Not eligible to join: {}",
                report.reasons.join("; ")
            )));
        }

        let now = Utc::now();
        BrokerRepository::new(self.pool.clone())
            .insert_assignment(
                driver.id,
                broker_id,
                broker.company_id,
                BrokerAssignmentStatus::Assigned,
                scope.actor_id,
                Some(scope.actor_id),
                now,
            )
            .await
    }

    /// Solicitud de unión pendiente de aprobación del admin
    pub async fn request_assignment(
        &self,
        scope: &AuthScope,
        broker_id: Uuid,
    ) -> Result<BrokerAssignment, AppError> {
        let broker = self.load_broker(broker_id).await?;
        let driver = self.driver_for_actor(scope, broker.company_id).await?;

        if !broker.allow_driver_requests {
            return Err(AppError::Forbidden(
                "This trip source does not accept driver requests".to_string(),
            ));
        }

        self.ensure_no_active_assignment(driver.id, broker_id).await?;

        BrokerRepository::new(self.pool.clone())
            .insert_assignment(
                driver.id,
                broker_id,
                broker.company_id,
                BrokerAssignmentStatus::Pending,
                scope.actor_id,
                None,
                Utc::now(),
            )
            .await
    }

    pub async fn approve_assignment(
        &self,
        scope: &AuthScope,
        assignment_id: Uuid,
    ) -> Result<BrokerAssignment, AppError> {
        scope.require_staff()?;
        let assignment = self.load_assignment(assignment_id).await?;
        scope.ensure_company(assignment.company_id)?;

        BrokerRepository::new(self.pool.clone())
            .approve_assignment(assignment_id, scope.actor_id, Utc::now())
            .await
    }

    pub async fn deny_assignment(
        &self,
        scope: &AuthScope,
        assignment_id: Uuid,
        reason: Option<String>,
    ) -> Result<BrokerAssignment, AppError> {
        scope.require_staff()?;
        let assignment = self.load_assignment(assignment_id).await?;
        scope.ensure_company(assignment.company_id)?;

        BrokerRepository::new(self.pool.clone())
            .remove_assignment(
                assignment_id,
                scope.actor_id,
                reason.as_deref().unwrap_or("Request denied"),
                Utc::now(),
            )
            .await
    }

    pub async fn remove_assignment(
        &self,
        scope: &AuthScope,
        assignment_id: Uuid,
        reason: Option<String>,
    ) -> Result<BrokerAssignment, AppError> {
        scope.require_staff()?;
        let assignment = self.load_assignment(assignment_id).await?;
        scope.ensure_company(assignment.company_id)?;

        BrokerRepository::new(self.pool.clone())
            .remove_assignment(
                assignment_id,
                scope.actor_id,
                reason.as_deref().unwrap_or("Removed by admin"),
                Utc::now(),
            )
            .await
    }

    // ============ Helpers ============

    /// Evalúa conductor + mejor vehículo disponible contra el broker
    async fn evaluate(
        &self,
        broker: &Broker,
        driver: &Driver,
    ) -> Result<EligibilityResponse, AppError> {
        let now = Utc::now();
        let credential_repo = CredentialRepository::new(self.pool.clone());
        let credential_types = credential_repo
            .list_types_by_company(driver.company_id)
            .await?;

        let driver_credentials =
            instances_by_type(&credential_repo, CredentialTable::Driver, driver.id).await?;

        // Informe del lado del conductor (sin vehículo)
        let driver_report = eligibility::evaluate(
            driver,
            None,
            broker,
            &credential_types,
            &driver_credentials,
            now,
        );

        // Basta con que un vehículo activo del conductor pase los chequeos
        let vehicles = VehicleRepository::new(self.pool.clone())
            .list_for_driver(driver.id)
            .await?;

        let mut has_eligible_vehicle = false;
        for vehicle in &vehicles {
            let vehicle_credentials =
                instances_by_type(&credential_repo, CredentialTable::Vehicle, vehicle.id).await?;
            let candidate = VehicleCandidate {
                vehicle,
                credentials: &vehicle_credentials,
            };
            let report = eligibility::evaluate(
                driver,
                Some(candidate),
                broker,
                &credential_types,
                &driver_credentials,
                now,
            );
            if report.eligible {
                has_eligible_vehicle = true;
                break;
            }
        }

        let mut reasons = driver_report.reasons;
        // Los fallos estructurales del conductor ya cortaron: solo añadimos
        // el veredicto de vehículo cuando el resto es evaluable
        if driver_report.eligible && !has_eligible_vehicle {
            reasons.push("No eligible vehicle".to_string());
        }

        Ok(EligibilityResponse {
            eligible: driver_report.eligible && has_eligible_vehicle,
            join_mode: driver_report.join_mode,
            reasons,
        })
    }

    async fn load_broker(&self, broker_id: Uuid) -> Result<Broker, AppError> {
        BrokerRepository::new(self.pool.clone())
            .find_by_id(broker_id)
            .await?
            .ok_or_else(|| not_found_error("Broker", &broker_id.to_string()))
    }

    async fn load_driver(&self, driver_id: Uuid) -> Result<Driver, AppError> {
        DriverRepository::new(self.pool.clone())
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))
    }

    async fn load_assignment(&self, assignment_id: Uuid) -> Result<BrokerAssignment, AppError> {
        BrokerRepository::new(self.pool.clone())
            .find_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
    }

    async fn driver_for_actor(
        &self,
        scope: &AuthScope,
        company_id: Uuid,
    ) -> Result<Driver, AppError> {
        scope.ensure_company(company_id)?;
        DriverRepository::new(self.pool.clone())
            .find_by_user_and_company(scope.actor_id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver record not found".to_string()))
    }

    async fn ensure_no_active_assignment(
        &self,
        driver_id: Uuid,
        broker_id: Uuid,
    ) -> Result<(), AppError> {
        let existing = BrokerRepository::new(self.pool.clone())
            .find_assignment(driver_id, broker_id)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "Driver already has an active or pending relationship with this trip source"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

async fn instances_by_type(
    repo: &CredentialRepository,
    table: CredentialTable,
    subject_id: Uuid,
) -> Result<HashMap<Uuid, InstanceState>, AppError> {
    let records = repo.list_for_subject(table, subject_id).await?;
    Ok(records
        .iter()
        .map(|record| (record.credential_type_id, InstanceState::from(record)))
        .collect())
}
