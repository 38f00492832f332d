//! Modelo de ApplicationDraft
//!
//! Autosave transitorio del formulario de solicitud, con clave natural
//! (user_id, company_id). Se elimina al enviar la solicitud con éxito.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Draft principal - mapea a application_drafts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationDraft {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub form_data: serde_json::Value,
    pub current_step: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para guardar (upsert) el draft
#[derive(Debug, Deserialize, Validate)]
pub struct SaveDraftRequest {
    pub company_id: Uuid,
    pub form_data: serde_json::Value,

    #[validate(range(min = 0, max = 20))]
    pub current_step: i32,
}

/// Response de draft para la API
#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub form_data: serde_json::Value,
    pub current_step: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationDraft> for DraftResponse {
    fn from(draft: ApplicationDraft) -> Self {
        Self {
            id: draft.id,
            company_id: draft.company_id,
            form_data: draft.form_data,
            current_step: draft.current_step,
            updated_at: draft.updated_at,
        }
    }
}
