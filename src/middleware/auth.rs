//! Middleware de autenticación JWT
//!
//! Decodifica el bearer token y expone un AuthScope explícito
//! (actor, rol, empresa) que los controllers reciben como parámetro.
//! La emisión de tokens y las sesiones viven fuera de este servicio.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: Option<String>,
    pub role: String,
    pub company_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Contexto autenticado que se inyecta en las requests. Se pasa explícito
/// a los controllers para que los límites de autorización sean auditables.
#[derive(Debug, Clone)]
pub struct AuthScope {
    pub actor_id: Uuid,
    pub role: UserRole,
    pub company_id: Option<Uuid>,
    pub email: Option<String>,
}

impl AuthScope {
    /// Empresa del actor; staff sin empresa no puede operar sobre datos de tenant
    pub fn require_company(&self) -> Result<Uuid, AppError> {
        self.company_id
            .ok_or_else(|| AppError::Forbidden("No company associated with this account".to_string()))
    }

    /// Solo admin/coordinator/super_admin
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_company_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// El recurso debe pertenecer a la empresa del actor (super_admin cruza tenants)
    pub fn ensure_company(&self, company_id: Uuid) -> Result<(), AppError> {
        if self.role == UserRole::SuperAdmin {
            return Ok(());
        }
        match self.company_id {
            Some(own) if own == company_id => Ok(()),
            _ => Err(AppError::Forbidden(
                "Resource does not belong to this company".to_string(),
            )),
        }
    }

    /// Un conductor solo accede a sus propios registros; el staff de la
    /// empresa accede a cualquier conductor de su tenant.
    pub fn can_access_driver(&self, driver_user_id: Uuid, driver_company_id: Uuid) -> Result<(), AppError> {
        if self.role == UserRole::Driver {
            if self.actor_id == driver_user_id {
                return Ok(());
            }
            return Err(AppError::Forbidden(
                "Drivers can only access their own records".to_string(),
            ));
        }
        self.ensure_company(driver_company_id)
    }
}

/// Decodificar y validar el token. Función pura para poder testearla.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthScope, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))?;

    let claims = token_data.claims;

    let actor_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Jwt("Invalid subject in token".to_string()))?;

    let role = UserRole::from_str(&claims.role)
        .ok_or_else(|| AppError::Jwt(format!("Unknown role '{}'", claims.role)))?;

    let company_id = match claims.company_id.as_deref() {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| AppError::Jwt("Invalid company_id in token".to_string()))?,
        ),
        None => None,
    };

    Ok(AuthScope {
        actor_id,
        role,
        company_id,
        email: claims.email,
    })
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let scope = decode_token(auth_header, &state.config.jwt_secret)?;

    request.extensions_mut().insert(scope);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn make_token(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_ref()),
        )
        .unwrap()
    }

    fn valid_claims() -> Claims {
        let now = Utc::now().timestamp() as usize;
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: Some("driver@example.com".to_string()),
            role: "driver".to_string(),
            company_id: Some(Uuid::new_v4().to_string()),
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_decode_valid_token() {
        let claims = valid_claims();
        let scope = decode_token(&make_token(&claims), SECRET).unwrap();

        assert_eq!(scope.actor_id.to_string(), claims.sub);
        assert_eq!(scope.role, UserRole::Driver);
        assert_eq!(scope.email.as_deref(), Some("driver@example.com"));
        assert!(scope.company_id.is_some());
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = make_token(&valid_claims());
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let now = Utc::now().timestamp() as usize;
        let mut claims = valid_claims();
        claims.exp = now - 3600;
        claims.iat = now - 7200;
        assert!(decode_token(&make_token(&claims), SECRET).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_role() {
        let mut claims = valid_claims();
        claims.role = "superuser".to_string();
        assert!(decode_token(&make_token(&claims), SECRET).is_err());
    }

    #[test]
    fn test_ensure_company() {
        let company_id = Uuid::new_v4();
        let scope = AuthScope {
            actor_id: Uuid::new_v4(),
            role: UserRole::Admin,
            company_id: Some(company_id),
            email: None,
        };
        assert!(scope.ensure_company(company_id).is_ok());
        assert!(scope.ensure_company(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_super_admin_crosses_tenants() {
        let scope = AuthScope {
            actor_id: Uuid::new_v4(),
            role: UserRole::SuperAdmin,
            company_id: None,
            email: None,
        };
        assert!(scope.ensure_company(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_driver_only_accesses_own_records() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let scope = AuthScope {
            actor_id: user_id,
            role: UserRole::Driver,
            company_id: Some(company_id),
            email: None,
        };
        assert!(scope.can_access_driver(user_id, company_id).is_ok());
        assert!(scope.can_access_driver(Uuid::new_v4(), company_id).is_err());
    }

    #[test]
    fn test_require_staff() {
        let mut scope = AuthScope {
            actor_id: Uuid::new_v4(),
            role: UserRole::Driver,
            company_id: None,
            email: None,
        };
        assert!(scope.require_staff().is_err());
        scope.role = UserRole::Coordinator;
        assert!(scope.require_staff().is_ok());
    }
}
