//! Controller de vehículos y asignaciones conductor-vehículo

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::AuthScope;
use crate::models::assignment::{
    AssignVehicleRequest, AssignmentType, EndAssignmentRequest, VehicleAssignmentResponse,
};
use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, UpdateVehicleStatusRequest, Vehicle,
    VehicleOwnership, VehicleResponse, VehicleStatus,
};
use crate::repositories::assignment_repository::AssignmentRepository;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppError};
use crate::utils::validation::validate_license_plate;

pub struct VehicleController {
    pool: PgPool,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        scope: &AuthScope,
        request: CreateVehicleRequest,
    ) -> Result<VehicleResponse, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        validate_license_plate(&request.license_plate)
            .map_err(|e| validation_error("license_plate", e))?;

        let repo = VehicleRepository::new(self.pool.clone());

        if repo
            .license_plate_exists(&request.license_plate, company_id)
            .await?
        {
            return Err(conflict_error(
                "Vehicle",
                "license_plate",
                &request.license_plate,
            ));
        }

        match request.ownership {
            VehicleOwnership::Driver => {
                let owner_id = request.owner_driver_id.ok_or_else(|| {
                    AppError::BadRequest(
                        "owner_driver_id is required for driver-owned vehicles".to_string(),
                    )
                })?;
                let owner = DriverRepository::new(self.pool.clone())
                    .find_by_id(owner_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Owner driver not found".to_string()))?;
                scope.ensure_company(owner.company_id)?;
            }
            VehicleOwnership::Company => {
                if request.owner_driver_id.is_some() {
                    return Err(AppError::BadRequest(
                        "Company vehicles cannot have an owner driver".to_string(),
                    ));
                }
            }
        }

        let vehicle = repo.create(company_id, &request).await?;
        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self, scope: &AuthScope) -> Result<Vec<VehicleResponse>, AppError> {
        scope.require_staff()?;
        let company_id = scope.require_company()?;

        let vehicles = VehicleRepository::new(self.pool.clone())
            .list_by_company(company_id)
            .await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn list_for_driver(
        &self,
        scope: &AuthScope,
        driver_id: Uuid,
    ) -> Result<Vec<VehicleResponse>, AppError> {
        let driver = DriverRepository::new(self.pool.clone())
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
        scope.can_access_driver(driver.user_id, driver.company_id)?;

        let vehicles = VehicleRepository::new(self.pool.clone())
            .list_for_driver(driver_id)
            .await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn get(&self, scope: &AuthScope, vehicle_id: Uuid) -> Result<VehicleResponse, AppError> {
        let vehicle = self.load(vehicle_id).await?;
        scope.ensure_company(vehicle.company_id)?;

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn update(
        &self,
        scope: &AuthScope,
        vehicle_id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<VehicleResponse, AppError> {
        scope.require_staff()?;
        let vehicle = self.load(vehicle_id).await?;
        scope.ensure_company(vehicle.company_id)?;

        let updated = VehicleRepository::new(self.pool.clone())
            .update(vehicle_id, &request)
            .await?;
        Ok(VehicleResponse::from(updated))
    }

    pub async fn update_status(
        &self,
        scope: &AuthScope,
        vehicle_id: Uuid,
        request: UpdateVehicleStatusRequest,
    ) -> Result<VehicleResponse, AppError> {
        scope.require_staff()?;
        let vehicle = self.load(vehicle_id).await?;
        scope.ensure_company(vehicle.company_id)?;

        if vehicle.status == VehicleStatus::Retired {
            return Err(AppError::Conflict(
                "Retired vehicles cannot change status".to_string(),
            ));
        }

        let updated = VehicleRepository::new(self.pool.clone())
            .update_status(vehicle_id, request.status, request.status_reason.as_deref())
            .await?;
        Ok(VehicleResponse::from(updated))
    }

    // ============ Asignaciones ============

    pub async fn assign(
        &self,
        scope: &AuthScope,
        request: AssignVehicleRequest,
    ) -> Result<VehicleAssignmentResponse, AppError> {
        scope.require_staff()?;

        let vehicle = self.load(request.vehicle_id).await?;
        scope.ensure_company(vehicle.company_id)?;

        let driver = DriverRepository::new(self.pool.clone())
            .find_by_id(request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
        if driver.company_id != vehicle.company_id {
            return Err(AppError::BadRequest(
                "Driver and vehicle belong to different companies".to_string(),
            ));
        }
        if vehicle.status != VehicleStatus::Active {
            return Err(AppError::Conflict("Vehicle is not active".to_string()));
        }

        let now = Utc::now();
        let starts_at = request.starts_at.unwrap_or(now);

        // Los préstamos llevan fecha de fin obligatoria y posterior al inicio
        if request.assignment_type == AssignmentType::Borrowed {
            match request.ends_at {
                Some(ends_at) if ends_at > starts_at => {}
                Some(_) => {
                    return Err(AppError::BadRequest(
                        "ends_at must be after starts_at".to_string(),
                    ))
                }
                None => {
                    return Err(AppError::BadRequest(
                        "Borrowed assignments require ends_at".to_string(),
                    ))
                }
            }
        }

        let assignment_repo = AssignmentRepository::new(self.pool.clone());
        let current = assignment_repo
            .find_active_by_vehicle(request.vehicle_id)
            .await?;

        let mut tx = self.pool.begin().await?;

        // Transferencia: cierra la asignación activa del vehículo
        if let Some(active) = current {
            if active.driver_id != request.driver_id {
                sqlx::query(
                    r#"
                    UPDATE driver_vehicle_assignments
                    SET ended_at = $2, ended_by = $3, end_reason = 'Transferred to another driver',
                        is_primary = false, updated_at = now()
                    WHERE id = $1
                    "#,
                )
                .bind(active.id)
                .bind(now)
                .bind(scope.actor_id)
                .execute(&mut *tx)
                .await?;
            } else {
                return Err(AppError::Conflict(
                    "Vehicle is already assigned to this driver".to_string(),
                ));
            }
        }

        // Exactamente una primaria activa por conductor
        if request.is_primary {
            AssignmentRepository::demote_primary(&mut *tx, request.driver_id).await?;
        }

        let assignment = AssignmentRepository::insert(
            &mut *tx,
            request.driver_id,
            request.vehicle_id,
            vehicle.company_id,
            request.assignment_type,
            request.is_primary,
            starts_at,
            request.ends_at,
            Some(scope.actor_id),
        )
        .await?;

        tx.commit().await?;

        Ok(VehicleAssignmentResponse::from(assignment))
    }

    pub async fn end_assignment(
        &self,
        scope: &AuthScope,
        assignment_id: Uuid,
        request: EndAssignmentRequest,
    ) -> Result<VehicleAssignmentResponse, AppError> {
        scope.require_staff()?;

        let repo = AssignmentRepository::new(self.pool.clone());
        let assignment = repo
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;
        scope.ensure_company(assignment.company_id)?;

        if !assignment.is_active() {
            return Err(AppError::Conflict("Assignment already ended".to_string()));
        }

        let ended = repo
            .end(assignment_id, scope.actor_id, &request.reason, Utc::now())
            .await?;
        Ok(VehicleAssignmentResponse::from(ended))
    }

    pub async fn list_driver_assignments(
        &self,
        scope: &AuthScope,
        driver_id: Uuid,
    ) -> Result<Vec<VehicleAssignmentResponse>, AppError> {
        let driver = DriverRepository::new(self.pool.clone())
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;
        scope.can_access_driver(driver.user_id, driver.company_id)?;

        let assignments = AssignmentRepository::new(self.pool.clone())
            .list_active_by_driver(driver_id)
            .await?;

        Ok(assignments
            .into_iter()
            .map(VehicleAssignmentResponse::from)
            .collect())
    }

    async fn load(&self, vehicle_id: Uuid) -> Result<Vehicle, AppError> {
        VehicleRepository::new(self.pool.clone())
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))
    }
}
