//! Modelo de Company
//!
//! Este módulo contiene el struct Company (tenant) y sus variantes.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Estado del tenant - mapea al ENUM company_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "company_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    Active,
    Inactive,
    Suspended,
}

impl CompanyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Active => "active",
            CompanyStatus::Inactive => "inactive",
            CompanyStatus::Suspended => "suspended",
        }
    }
}

/// Company principal - mapea exactamente a la tabla companies
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub status: CompanyStatus,
    pub status_reason: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Una empresa suspendida o inactiva no acepta nuevas solicitudes
    pub fn accepts_applications(&self) -> bool {
        self.status == CompanyStatus::Active
    }
}

/// Response de empresa para la API (branding incluido)
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub status: CompanyStatus,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            status: company.status,
            logo_url: company.logo_url,
            primary_color: company.primary_color,
            created_at: company.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_applications() {
        let mut company = Company {
            id: Uuid::new_v4(),
            name: "Acme Transit".to_string(),
            status: CompanyStatus::Active,
            status_reason: None,
            logo_url: None,
            primary_color: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(company.accepts_applications());

        company.status = CompanyStatus::Suspended;
        assert!(!company.accepts_applications());

        company.status = CompanyStatus::Inactive;
        assert!(!company.accepts_applications());
    }
}
