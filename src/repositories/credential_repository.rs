use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::credential::{
    CreateCredentialTypeRequest, CredentialRecord, CredentialTable, CredentialType,
};
use crate::utils::errors::AppError;

/// Columnas de payload que escribe un envío. Las que no correspondan al
/// submission_type van a NULL, lo que limpia restos de envíos anteriores.
#[derive(Debug, Default)]
pub struct SubmissionWrite {
    pub document_urls: Option<Vec<String>>,
    pub signature_data: Option<serde_json::Value>,
    pub form_data: Option<serde_json::Value>,
    pub entered_date: Option<NaiveDate>,
    pub driver_expiration_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

const RECORD_COLUMNS: &str = "id, {subject} AS subject_id, credential_type_id, company_id, status, \
     document_urls, signature_data, form_data, entered_date, driver_expiration_date, \
     notes, expires_at, submitted_at, reviewed_at, reviewed_by, review_notes, \
     rejection_reason, submission_version, created_at, updated_at";

fn record_columns(table: CredentialTable) -> String {
    RECORD_COLUMNS.replace("{subject}", table.subject_column())
}

pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ============ Tipos de credencial ============

    pub async fn list_types_by_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<CredentialType>, AppError> {
        let types = sqlx::query_as::<_, CredentialType>(
            "SELECT * FROM credential_types WHERE company_id = $1 ORDER BY display_order, name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    pub async fn find_type(&self, id: Uuid) -> Result<Option<CredentialType>, AppError> {
        let credential_type = sqlx::query_as::<_, CredentialType>(
            "SELECT * FROM credential_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential_type)
    }

    pub async fn create_type(
        &self,
        company_id: Uuid,
        request: &CreateCredentialTypeRequest,
        created_by: Uuid,
    ) -> Result<CredentialType, AppError> {
        let credential_type = sqlx::query_as::<_, CredentialType>(
            r#"
            INSERT INTO credential_types (
                id, company_id, name, description, category, scope, broker_id,
                employment_type, requirement, vehicle_types, submission_type,
                expiration_type, expiration_interval_days, expiration_warning_days,
                grace_period_days, display_order, is_active, created_at, updated_at, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, true, now(), now(), $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.category)
        .bind(request.scope)
        .bind(request.broker_id)
        .bind(request.employment_type)
        .bind(request.requirement)
        .bind(&request.vehicle_types)
        .bind(request.submission_type)
        .bind(request.expiration_type)
        .bind(request.expiration_interval_days)
        .bind(request.expiration_warning_days)
        .bind(request.grace_period_days)
        .bind(request.display_order)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(credential_type)
    }

    // ============ Instancias ============

    pub async fn list_for_subject(
        &self,
        table: CredentialTable,
        subject_id: Uuid,
    ) -> Result<Vec<CredentialRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            record_columns(table),
            table.table_name(),
            table.subject_column(),
        );

        let records = sqlx::query_as::<_, CredentialRecord>(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    pub async fn find_record(
        &self,
        table: CredentialTable,
        id: Uuid,
    ) -> Result<Option<CredentialRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            record_columns(table),
            table.table_name(),
        );

        let record = sqlx::query_as::<_, CredentialRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Upsert idempotente sobre la clave natural (sujeto, tipo). Requiere el
    /// índice único de la tabla: dos "ensure" concurrentes para el mismo par
    /// producen exactamente una fila.
    pub async fn ensure(
        &self,
        table: CredentialTable,
        subject_id: Uuid,
        credential_type_id: Uuid,
        company_id: Uuid,
    ) -> Result<Uuid, AppError> {
        let sql = format!(
            r#"
            INSERT INTO {table} (
                id, {subject}, credential_type_id, company_id, status,
                submission_version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, 'not_submitted', 0, now(), now())
            ON CONFLICT ({subject}, credential_type_id)
            DO UPDATE SET updated_at = now()
            RETURNING id
            "#,
            table = table.table_name(),
            subject = table.subject_column(),
        );

        let row: (Uuid,) = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(subject_id)
            .bind(credential_type_id)
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Escribe el payload y pasa la instancia a pending_review
    pub async fn apply_submission(
        &self,
        table: CredentialTable,
        id: Uuid,
        write: &SubmissionWrite,
        now: DateTime<Utc>,
    ) -> Result<CredentialRecord, AppError> {
        let sql = format!(
            r#"
            UPDATE {table} SET
                document_urls = $2,
                signature_data = $3,
                form_data = $4,
                entered_date = $5,
                driver_expiration_date = $6,
                notes = $7,
                status = 'pending_review',
                submitted_at = $8,
                submission_version = submission_version + 1,
                rejection_reason = NULL,
                updated_at = now()
            WHERE id = $1
            RETURNING {columns}
            "#,
            table = table.table_name(),
            columns = record_columns(table),
        );

        let record = sqlx::query_as::<_, CredentialRecord>(&sql)
            .bind(id)
            .bind(&write.document_urls)
            .bind(&write.signature_data)
            .bind(&write.form_data)
            .bind(write.entered_date)
            .bind(write.driver_expiration_date)
            .bind(&write.notes)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn approve(
        &self,
        table: CredentialTable,
        id: Uuid,
        reviewed_by: Uuid,
        expires_at: Option<DateTime<Utc>>,
        review_notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CredentialRecord, AppError> {
        let sql = format!(
            r#"
            UPDATE {table} SET
                status = 'approved',
                reviewed_at = $2,
                reviewed_by = $3,
                review_notes = $4,
                expires_at = $5,
                rejection_reason = NULL,
                updated_at = now()
            WHERE id = $1
            RETURNING {columns}
            "#,
            table = table.table_name(),
            columns = record_columns(table),
        );

        let record = sqlx::query_as::<_, CredentialRecord>(&sql)
            .bind(id)
            .bind(now)
            .bind(reviewed_by)
            .bind(review_notes)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn reject(
        &self,
        table: CredentialTable,
        id: Uuid,
        reviewed_by: Uuid,
        reason: &str,
        review_notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CredentialRecord, AppError> {
        let sql = format!(
            r#"
            UPDATE {table} SET
                status = 'rejected',
                reviewed_at = $2,
                reviewed_by = $3,
                review_notes = $4,
                rejection_reason = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING {columns}
            "#,
            table = table.table_name(),
            columns = record_columns(table),
        );

        let record = sqlx::query_as::<_, CredentialRecord>(&sql)
            .bind(id)
            .bind(now)
            .bind(reviewed_by)
            .bind(review_notes)
            .bind(reason)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_columns_alias_per_table() {
        let driver = record_columns(CredentialTable::Driver);
        assert!(driver.starts_with("id, driver_id AS subject_id"));

        let vehicle = record_columns(CredentialTable::Vehicle);
        assert!(vehicle.starts_with("id, vehicle_id AS subject_id"));
    }
}
