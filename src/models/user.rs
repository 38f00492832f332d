//! Modelo de User
//!
//! Identidad de autenticación. Un User con rol driver tiene un registro
//! Driver asociado (1:1) en la misma empresa.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Roles del sistema - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Driver,
    Admin,
    Coordinator,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Driver => "driver",
            UserRole::Admin => "admin",
            UserRole::Coordinator => "coordinator",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "driver" => Some(UserRole::Driver),
            "admin" => Some(UserRole::Admin),
            "coordinator" => Some(UserRole::Coordinator),
            "super_admin" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }

    /// Roles con acceso al panel de administración
    pub fn is_company_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coordinator | UserRole::SuperAdmin)
    }
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response de usuario para la API
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            company_id: user.company_id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Driver,
            UserRole::Admin,
            UserRole::Coordinator,
            UserRole::SuperAdmin,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("manager"), None);
    }

    #[test]
    fn test_is_company_staff() {
        assert!(!UserRole::Driver.is_company_staff());
        assert!(UserRole::Admin.is_company_staff());
        assert!(UserRole::Coordinator.is_company_staff());
        assert!(UserRole::SuperAdmin.is_company_staff());
    }
}
