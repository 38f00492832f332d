use sqlx::PgPool;
use uuid::Uuid;

use crate::models::application::ApplicationDraft;
use crate::utils::errors::AppError;

pub struct DraftRepository {
    pool: PgPool,
}

impl DraftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, AppError> {
        let draft = sqlx::query_as::<_, ApplicationDraft>(
            "SELECT * FROM application_drafts WHERE user_id = $1 AND company_id = $2",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(draft)
    }

    /// Upsert sobre la clave natural (user_id, company_id)
    pub async fn save(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        form_data: &serde_json::Value,
        current_step: i32,
    ) -> Result<ApplicationDraft, AppError> {
        let draft = sqlx::query_as::<_, ApplicationDraft>(
            r#"
            INSERT INTO application_drafts (id, user_id, company_id, form_data, current_step, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            ON CONFLICT (user_id, company_id)
            DO UPDATE SET
                form_data = EXCLUDED.form_data,
                current_step = EXCLUDED.current_step,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(company_id)
        .bind(form_data)
        .bind(current_step)
        .fetch_one(&self.pool)
        .await?;

        Ok(draft)
    }

    pub async fn delete(&self, user_id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM application_drafts WHERE user_id = $1 AND company_id = $2")
            .bind(user_id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
