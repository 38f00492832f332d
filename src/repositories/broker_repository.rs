use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::broker::{
    Broker, BrokerAssignment, BrokerAssignmentStatus, BrokerRate, BrokerStatus,
    CreateBrokerRequest, UpdateBrokerRatesRequest,
};
use crate::utils::errors::AppError;

/// Contadores por broker para el dashboard de administración
#[derive(Debug, sqlx::FromRow)]
pub struct BrokerCounts {
    pub broker_id: Uuid,
    pub assigned_count: i64,
    pub pending_count: i64,
    pub credential_count: i64,
}

pub struct BrokerRepository {
    pool: PgPool,
}

impl BrokerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Broker>, AppError> {
        let broker = sqlx::query_as::<_, Broker>("SELECT * FROM brokers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(broker)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Broker>, AppError> {
        let brokers = sqlx::query_as::<_, Broker>(
            "SELECT * FROM brokers WHERE company_id = $1 ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(brokers)
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: &CreateBrokerRequest,
        created_by: Uuid,
    ) -> Result<Broker, AppError> {
        let broker = sqlx::query_as::<_, Broker>(
            r#"
            INSERT INTO brokers (
                id, company_id, name, code, contact_name, contact_email, contact_phone,
                service_states, accepted_vehicle_types, accepted_employment_types,
                allow_driver_requests, allow_driver_auto_signup,
                status, created_at, updated_at, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'active', now(), now(), $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&request.name)
        .bind(&request.code)
        .bind(&request.contact_name)
        .bind(&request.contact_email)
        .bind(&request.contact_phone)
        .bind(&request.service_states)
        .bind(&request.accepted_vehicle_types)
        .bind(&request.accepted_employment_types)
        .bind(request.allow_driver_requests)
        .bind(request.allow_driver_auto_signup)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(broker)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: BrokerStatus,
    ) -> Result<Broker, AppError> {
        let broker = sqlx::query_as::<_, Broker>(
            "UPDATE brokers SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(broker)
    }

    pub async fn counts_by_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<BrokerCounts>, AppError> {
        let counts = sqlx::query_as::<_, BrokerCounts>(
            r#"
            SELECT
                b.id AS broker_id,
                count(a.id) FILTER (WHERE a.status = 'assigned') AS assigned_count,
                count(a.id) FILTER (WHERE a.status = 'pending') AS pending_count,
                (SELECT count(*) FROM credential_types ct
                 WHERE ct.broker_id = b.id AND ct.scope = 'broker') AS credential_count
            FROM brokers b
            LEFT JOIN driver_broker_assignments a ON a.broker_id = b.id
            WHERE b.company_id = $1
            GROUP BY b.id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    // ============ Asignaciones driver-broker ============

    pub async fn find_assignment(
        &self,
        driver_id: Uuid,
        broker_id: Uuid,
    ) -> Result<Option<BrokerAssignment>, AppError> {
        // La última relación no eliminada manda
        let assignment = sqlx::query_as::<_, BrokerAssignment>(
            r#"
            SELECT * FROM driver_broker_assignments
            WHERE driver_id = $1 AND broker_id = $2 AND status != 'removed'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(driver_id)
        .bind(broker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn find_assignment_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<BrokerAssignment>, AppError> {
        let assignment = sqlx::query_as::<_, BrokerAssignment>(
            "SELECT * FROM driver_broker_assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn list_assignments_by_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<BrokerAssignment>, AppError> {
        let assignments = sqlx::query_as::<_, BrokerAssignment>(
            r#"
            SELECT * FROM driver_broker_assignments
            WHERE driver_id = $1 AND status != 'removed'
            ORDER BY created_at DESC
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    pub async fn insert_assignment(
        &self,
        driver_id: Uuid,
        broker_id: Uuid,
        company_id: Uuid,
        status: BrokerAssignmentStatus,
        requested_by: Uuid,
        approved_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<BrokerAssignment, AppError> {
        let assignment = sqlx::query_as::<_, BrokerAssignment>(
            r#"
            INSERT INTO driver_broker_assignments (
                id, driver_id, broker_id, company_id, status,
                requested_by, requested_at, approved_by, approved_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(driver_id)
        .bind(broker_id)
        .bind(company_id)
        .bind(status)
        .bind(requested_by)
        .bind(now)
        .bind(approved_by)
        .bind(approved_by.map(|_| now))
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn approve_assignment(
        &self,
        id: Uuid,
        approved_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<BrokerAssignment, AppError> {
        let assignment = sqlx::query_as::<_, BrokerAssignment>(
            r#"
            UPDATE driver_broker_assignments
            SET status = 'assigned', approved_by = $2, approved_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approved_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn remove_assignment(
        &self,
        id: Uuid,
        removed_by: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<BrokerAssignment, AppError> {
        let assignment = sqlx::query_as::<_, BrokerAssignment>(
            r#"
            UPDATE driver_broker_assignments
            SET status = 'removed', removed_by = $2, removed_at = $3, removal_reason = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(removed_by)
        .bind(now)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    // ============ Tarifas ============

    pub async fn current_rates(&self, broker_id: Uuid) -> Result<Vec<BrokerRate>, AppError> {
        let rates = sqlx::query_as::<_, BrokerRate>(
            r#"
            SELECT * FROM broker_rates
            WHERE broker_id = $1 AND effective_to IS NULL
            ORDER BY vehicle_type
            "#,
        )
        .bind(broker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    /// Cierra la ventana vigente el día anterior a effective_from e inserta
    /// las tarifas nuevas, todo en una transacción.
    pub async fn replace_rates(
        &self,
        broker_id: Uuid,
        company_id: Uuid,
        request: &UpdateBrokerRatesRequest,
        created_by: Uuid,
    ) -> Result<Vec<BrokerRate>, AppError> {
        let mut tx = self.pool.begin().await?;
        let day_before = request.effective_from - Duration::days(1);

        sqlx::query(
            r#"
            UPDATE broker_rates SET effective_to = $2
            WHERE broker_id = $1 AND effective_to IS NULL
            "#,
        )
        .bind(broker_id)
        .bind(day_before)
        .execute(&mut *tx)
        .await?;

        let mut inserted = Vec::with_capacity(request.rates.len());
        for rate in &request.rates {
            let row = sqlx::query_as::<_, BrokerRate>(
                r#"
                INSERT INTO broker_rates (
                    id, broker_id, company_id, vehicle_type, base_rate, per_mile_rate,
                    effective_from, created_at, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, now(), $8)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(broker_id)
            .bind(company_id)
            .bind(rate.vehicle_type)
            .bind(rate.base_rate)
            .bind(rate.per_mile_rate)
            .bind(request.effective_from)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
