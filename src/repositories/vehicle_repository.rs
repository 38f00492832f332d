use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleOwnership, VehicleStatus,
    VehicleType,
};
use crate::utils::errors::AppError;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: &CreateVehicleRequest,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, company_id, make, model, year, color, license_plate, license_state,
                vehicle_type, ownership, owner_driver_id, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'active', now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&request.make)
        .bind(&request.model)
        .bind(request.year)
        .bind(&request.color)
        .bind(&request.license_plate)
        .bind(&request.license_state)
        .bind(request.vehicle_type)
        .bind(request.ownership)
        .bind(request.owner_driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Alta del vehículo propio de un solicitante 1099, dentro de la
    /// transacción de envío de solicitud
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_owned(
        conn: &mut PgConnection,
        company_id: Uuid,
        owner_driver_id: Uuid,
        make: &str,
        model: &str,
        year: i32,
        color: &str,
        license_plate: &str,
        license_state: &str,
        vehicle_type: VehicleType,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, company_id, make, model, year, color, license_plate, license_state,
                vehicle_type, ownership, owner_driver_id, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'active', now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(make)
        .bind(model)
        .bind(year)
        .bind(color)
        .bind(license_plate)
        .bind(license_state)
        .bind(vehicle_type)
        .bind(VehicleOwnership::Driver)
        .bind(owner_driver_id)
        .fetch_one(conn)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Vehículos con asignación activa para el conductor (para elegibilidad)
    pub async fn list_for_driver(&self, driver_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT v.* FROM vehicles v
            JOIN driver_vehicle_assignments a ON a.vehicle_id = v.id
            WHERE a.driver_id = $1 AND a.ended_at IS NULL
            ORDER BY a.is_primary DESC, v.created_at
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn license_plate_exists(
        &self,
        license_plate: &str,
        company_id: Uuid,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1 AND company_id = $2)",
        )
        .bind(license_plate)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateVehicleRequest,
    ) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                make = $2, model = $3, year = $4, color = $5,
                license_plate = $6, vehicle_type = $7, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.make.as_ref().unwrap_or(&current.make))
        .bind(request.model.as_ref().unwrap_or(&current.model))
        .bind(request.year.unwrap_or(current.year))
        .bind(request.color.as_ref().or(current.color.as_ref()))
        .bind(request.license_plate.as_ref().unwrap_or(&current.license_plate))
        .bind(request.vehicle_type.unwrap_or(current.vehicle_type))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        status_reason: Option<&str>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET status = $2, status_reason = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(status_reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }
}
