use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::user::{User, UserRole};
use crate::utils::errors::AppError;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Upsert del perfil dentro de la transacción de envío de solicitud.
    /// La identidad (id, email) viene del token; el perfil del payload.
    pub async fn upsert_profile(
        conn: &mut PgConnection,
        id: Uuid,
        email: &str,
        full_name: &str,
        phone: &str,
        company_id: Uuid,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, company_id, email, full_name, phone, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            ON CONFLICT (id)
            DO UPDATE SET
                company_id = EXCLUDED.company_id,
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                role = EXCLUDED.role,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(email)
        .bind(full_name)
        .bind(phone)
        .bind(UserRole::Driver)
        .fetch_one(conn)
        .await?;

        Ok(user)
    }
}
