use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::assignment::{AssignmentType, VehicleAssignment};
use crate::utils::errors::AppError;

pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VehicleAssignment>, AppError> {
        let assignment = sqlx::query_as::<_, VehicleAssignment>(
            "SELECT * FROM driver_vehicle_assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn list_active_by_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<VehicleAssignment>, AppError> {
        let assignments = sqlx::query_as::<_, VehicleAssignment>(
            r#"
            SELECT * FROM driver_vehicle_assignments
            WHERE driver_id = $1 AND ended_at IS NULL
            ORDER BY is_primary DESC, created_at
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    pub async fn find_active_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Option<VehicleAssignment>, AppError> {
        let assignment = sqlx::query_as::<_, VehicleAssignment>(
            r#"
            SELECT * FROM driver_vehicle_assignments
            WHERE vehicle_id = $1 AND ended_at IS NULL
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    /// Degrada la primaria activa del conductor. Se ejecuta en la misma
    /// transacción que el alta de la nueva primaria: exactamente una
    /// asignación primaria por conductor entre las activas.
    pub async fn demote_primary(
        conn: &mut PgConnection,
        driver_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE driver_vehicle_assignments
            SET is_primary = false, updated_at = now()
            WHERE driver_id = $1 AND ended_at IS NULL AND is_primary = true
            "#,
        )
        .bind(driver_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        driver_id: Uuid,
        vehicle_id: Uuid,
        company_id: Uuid,
        assignment_type: AssignmentType,
        is_primary: bool,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        assigned_by: Option<Uuid>,
    ) -> Result<VehicleAssignment, AppError> {
        let assignment = sqlx::query_as::<_, VehicleAssignment>(
            r#"
            INSERT INTO driver_vehicle_assignments (
                id, driver_id, vehicle_id, company_id, assignment_type, is_primary,
                starts_at, ends_at, assigned_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(driver_id)
        .bind(vehicle_id)
        .bind(company_id)
        .bind(assignment_type)
        .bind(is_primary)
        .bind(starts_at)
        .bind(ends_at)
        .bind(assigned_by)
        .fetch_one(conn)
        .await?;

        Ok(assignment)
    }

    pub async fn end(
        &self,
        id: Uuid,
        ended_by: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<VehicleAssignment, AppError> {
        let assignment = sqlx::query_as::<_, VehicleAssignment>(
            r#"
            UPDATE driver_vehicle_assignments
            SET ended_at = $2, ended_by = $3, end_reason = $4, is_primary = false, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(ended_by)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }
}
