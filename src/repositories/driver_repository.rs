use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::driver::{ApplicationStatus, Driver, DriverStatus, EmploymentType};
use crate::utils::errors::AppError;

/// Campos de una solicitud nueva o de un reenvío tras rechazo
#[derive(Debug)]
pub struct NewDriverApplication {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub employment_type: EmploymentType,
    pub date_of_birth: NaiveDate,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub license_number: String,
    pub license_state: String,
    pub license_expiration: NaiveDate,
    pub license_front_url: String,
    pub license_back_url: String,
    pub experience_notes: Option<String>,
    pub referral_source: Option<String>,
    pub eula_version: String,
}

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    pub async fn find_by_user_and_company(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE user_id = $1 AND company_id = $2",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Driver>, AppError> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    /// Inserta la solicitud dentro de la transacción de envío
    pub async fn insert_application(
        conn: &mut PgConnection,
        application: &NewDriverApplication,
        now: DateTime<Utc>,
    ) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (
                id, user_id, company_id, employment_type, application_status, status,
                date_of_birth, address_line1, address_line2, city, state, zip,
                license_number, license_state, license_expiration,
                license_front_url, license_back_url,
                experience_notes, referral_source,
                application_date, application_submitted_at,
                eula_accepted_at, eula_version,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, 'pending', 'inactive',
                $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15,
                $16, $17,
                $18, $18,
                $18, $19,
                now(), now()
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application.user_id)
        .bind(application.company_id)
        .bind(application.employment_type)
        .bind(application.date_of_birth)
        .bind(&application.address_line1)
        .bind(&application.address_line2)
        .bind(&application.city)
        .bind(&application.state)
        .bind(&application.zip)
        .bind(&application.license_number)
        .bind(&application.license_state)
        .bind(application.license_expiration)
        .bind(&application.license_front_url)
        .bind(&application.license_back_url)
        .bind(&application.experience_notes)
        .bind(&application.referral_source)
        .bind(now)
        .bind(&application.eula_version)
        .fetch_one(conn)
        .await?;

        Ok(driver)
    }

    /// Reenvío tras rechazo: resetea la fila existente a pending y limpia
    /// los campos de rechazo
    pub async fn resubmit_application(
        conn: &mut PgConnection,
        driver_id: Uuid,
        application: &NewDriverApplication,
        now: DateTime<Utc>,
    ) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET
                employment_type = $2,
                date_of_birth = $3,
                address_line1 = $4,
                address_line2 = $5,
                city = $6,
                state = $7,
                zip = $8,
                license_number = $9,
                license_state = $10,
                license_expiration = $11,
                license_front_url = $12,
                license_back_url = $13,
                experience_notes = $14,
                referral_source = $15,
                application_status = 'pending',
                application_date = $16,
                application_submitted_at = $16,
                rejection_reason = NULL,
                rejected_at = NULL,
                can_reapply_at = NULL,
                eula_accepted_at = $16,
                eula_version = $17,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(application.employment_type)
        .bind(application.date_of_birth)
        .bind(&application.address_line1)
        .bind(&application.address_line2)
        .bind(&application.city)
        .bind(&application.state)
        .bind(&application.zip)
        .bind(&application.license_number)
        .bind(&application.license_state)
        .bind(application.license_expiration)
        .bind(&application.license_front_url)
        .bind(&application.license_back_url)
        .bind(&application.experience_notes)
        .bind(&application.referral_source)
        .bind(now)
        .bind(&application.eula_version)
        .fetch_one(conn)
        .await?;

        Ok(driver)
    }

    pub async fn approve_application(
        &self,
        driver_id: Uuid,
        reviewed_by: Uuid,
    ) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET
                application_status = 'approved',
                status = 'active',
                rejection_reason = NULL,
                rejected_at = NULL,
                can_reapply_at = NULL,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;

        // reviewed_by queda en el log estructurado; la tabla no audita al revisor
        tracing::info!(driver_id = %driver_id, reviewed_by = %reviewed_by, "application approved");
        Ok(driver)
    }

    pub async fn reject_application(
        &self,
        driver_id: Uuid,
        reason: &str,
        can_reapply_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET
                application_status = 'rejected',
                rejection_reason = $2,
                rejected_at = $3,
                can_reapply_at = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(reason)
        .bind(now)
        .bind(can_reapply_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn update_status(
        &self,
        driver_id: Uuid,
        status: DriverStatus,
    ) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            "UPDATE drivers SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(driver_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn set_under_review(&self, driver_id: Uuid) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET application_status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(ApplicationStatus::UnderReview)
        .fetch_one(&self.pool)
        .await?;

        Ok(driver)
    }
}
