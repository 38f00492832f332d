//! CredentialStatusResolver
//!
//! Calcula el estado derivado (DisplayStatus) de una credencial a partir del
//! estado almacenado, las fechas y `now`. Función pura: mismas entradas,
//! misma salida.

use chrono::{DateTime, Duration, Utc};

use crate::models::credential::{
    CredentialRecord, CredentialStatus, CredentialType, DisplayStatus, ExpirationType,
};

/// Ventana de aviso por defecto cuando el tipo no configura una propia
pub const DEFAULT_WARNING_DAYS: i64 = 30;

/// Vista mínima de la instancia que necesita el resolutor
#[derive(Debug, Clone, Copy)]
pub struct InstanceState {
    pub status: CredentialStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&CredentialRecord> for InstanceState {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            status: record.status,
            expires_at: record.expires_at,
        }
    }
}

/// Resuelve el estado visible de la credencial.
///
/// Una credencial admin_verified sin envío queda en awaiting_verification:
/// el sujeto no puede actuar, espera la verificación de un administrador.
pub fn resolve(
    credential_type: &CredentialType,
    instance: Option<InstanceState>,
    now: DateTime<Utc>,
) -> DisplayStatus {
    let Some(state) = instance else {
        return unsubmitted(credential_type);
    };

    match state.status {
        CredentialStatus::NotSubmitted => unsubmitted(credential_type),
        CredentialStatus::PendingReview => DisplayStatus::PendingReview,
        CredentialStatus::Rejected => DisplayStatus::Rejected,
        CredentialStatus::Expired => DisplayStatus::Expired,
        CredentialStatus::Approved => resolve_approved(credential_type, state.expires_at, now),
    }
}

fn unsubmitted(credential_type: &CredentialType) -> DisplayStatus {
    if credential_type.is_admin_verified() {
        DisplayStatus::AwaitingVerification
    } else {
        DisplayStatus::NotSubmitted
    }
}

fn resolve_approved(
    credential_type: &CredentialType,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DisplayStatus {
    if credential_type.expiration_type == ExpirationType::Never {
        return DisplayStatus::Approved;
    }

    // Caducidad aún no calculada: se mantiene approved
    let Some(expires_at) = expires_at else {
        return DisplayStatus::Approved;
    };

    if now > expires_at {
        return DisplayStatus::Expired;
    }
    if expires_at - now <= Duration::days(warning_window_days(credential_type)) {
        return DisplayStatus::Expiring;
    }
    DisplayStatus::Approved
}

/// Ventana de aviso del tipo; 0 o negativa cae al valor por defecto
pub fn warning_window_days(credential_type: &CredentialType) -> i64 {
    if credential_type.expiration_warning_days > 0 {
        credential_type.expiration_warning_days as i64
    } else {
        DEFAULT_WARNING_DAYS
    }
}

/// Días hasta la caducidad, redondeando hacia arriba (mismo cálculo que la
/// tarjeta de la UI). Negativo = ya caducada.
pub fn days_until_expiration(instance: Option<InstanceState>, now: DateTime<Utc>) -> Option<i64> {
    let expires_at = instance?.expires_at?;
    let seconds = (expires_at - now).num_seconds();
    Some((seconds as f64 / 86_400.0).ceil() as i64)
}

/// El sujeto puede (re)enviar salvo que la credencial sea admin_verified o
/// esté pendiente de revisión. Una credencial caducada siempre es reenviable.
pub fn can_submit(credential_type: &CredentialType, status: CredentialStatus) -> bool {
    !credential_type.is_admin_verified() && status != CredentialStatus::PendingReview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::fixtures;
    use crate::models::credential::{CredentialCategory, SubmissionType};
    use uuid::Uuid;

    fn expiring_type(warning_days: i32) -> CredentialType {
        let mut credential_type =
            fixtures::credential_type(Uuid::new_v4(), CredentialCategory::Driver);
        credential_type.expiration_type = ExpirationType::FixedInterval;
        credential_type.expiration_interval_days = Some(30);
        credential_type.expiration_warning_days = warning_days;
        credential_type
    }

    fn approved(expires_at: Option<DateTime<Utc>>) -> InstanceState {
        InstanceState {
            status: CredentialStatus::Approved,
            expires_at,
        }
    }

    #[test]
    fn test_no_instance_is_not_submitted() {
        let credential_type =
            fixtures::credential_type(Uuid::new_v4(), CredentialCategory::Driver);
        assert_eq!(
            resolve(&credential_type, None, Utc::now()),
            DisplayStatus::NotSubmitted
        );
    }

    #[test]
    fn test_admin_verified_without_submission_awaits_verification() {
        let mut credential_type =
            fixtures::credential_type(Uuid::new_v4(), CredentialCategory::Driver);
        credential_type.submission_type = SubmissionType::AdminVerified;

        assert_eq!(
            resolve(&credential_type, None, Utc::now()),
            DisplayStatus::AwaitingVerification
        );

        let state = InstanceState {
            status: CredentialStatus::NotSubmitted,
            expires_at: None,
        };
        assert_eq!(
            resolve(&credential_type, Some(state), Utc::now()),
            DisplayStatus::AwaitingVerification
        );
    }

    #[test]
    fn test_stored_statuses_pass_through() {
        let credential_type =
            fixtures::credential_type(Uuid::new_v4(), CredentialCategory::Driver);
        let now = Utc::now();

        for (stored, expected) in [
            (CredentialStatus::PendingReview, DisplayStatus::PendingReview),
            (CredentialStatus::Rejected, DisplayStatus::Rejected),
            (CredentialStatus::Expired, DisplayStatus::Expired),
        ] {
            let state = InstanceState {
                status: stored,
                expires_at: None,
            };
            assert_eq!(resolve(&credential_type, Some(state), now), expected);
        }
    }

    #[test]
    fn test_never_expiring_approval_is_terminal() {
        // Scenario B: approved + expiration_type=never queda approved con
        // cualquier now, incluso con expires_at presente por error
        let credential_type =
            fixtures::credential_type(Uuid::new_v4(), CredentialCategory::Driver);
        let far_future = Utc::now() + Duration::days(365 * 50);
        let state = approved(Some(Utc::now() - Duration::days(1)));

        assert_eq!(resolve(&credential_type, Some(state), far_future), DisplayStatus::Approved);
    }

    #[test]
    fn test_approved_without_expiration_date_stays_approved() {
        let credential_type = expiring_type(30);
        let now = Utc::now();
        assert_eq!(
            resolve(&credential_type, Some(approved(None)), now),
            DisplayStatus::Approved
        );
    }

    #[test]
    fn test_expiration_ordering() {
        // P2: expires_at = now + 1 día -> expiring (warning >= 1);
        // expires_at = now - 1 segundo -> expired
        let credential_type = expiring_type(30);
        let now = Utc::now();

        let soon = approved(Some(now + Duration::days(1)));
        assert_eq!(resolve(&credential_type, Some(soon), now), DisplayStatus::Expiring);

        let past = approved(Some(now - Duration::seconds(1)));
        assert_eq!(resolve(&credential_type, Some(past), now), DisplayStatus::Expired);

        let comfortable = approved(Some(now + Duration::days(90)));
        assert_eq!(
            resolve(&credential_type, Some(comfortable), now),
            DisplayStatus::Approved
        );
    }

    #[test]
    fn test_warning_window_boundary_is_inclusive() {
        let credential_type = expiring_type(15);
        let now = Utc::now();

        let at_boundary = approved(Some(now + Duration::days(15)));
        assert_eq!(
            resolve(&credential_type, Some(at_boundary), now),
            DisplayStatus::Expiring
        );

        let just_outside = approved(Some(now + Duration::days(15) + Duration::seconds(1)));
        assert_eq!(
            resolve(&credential_type, Some(just_outside), now),
            DisplayStatus::Approved
        );
    }

    #[test]
    fn test_unset_warning_days_falls_back_to_default() {
        let credential_type = expiring_type(0);
        let now = Utc::now();

        let within_default = approved(Some(now + Duration::days(DEFAULT_WARNING_DAYS - 1)));
        assert_eq!(
            resolve(&credential_type, Some(within_default), now),
            DisplayStatus::Expiring
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        // P1: dos llamadas con entradas idénticas devuelven lo mismo
        let credential_type = expiring_type(30);
        let now = Utc::now();
        let state = approved(Some(now + Duration::days(3)));

        let first = resolve(&credential_type, Some(state), now);
        let second = resolve(&credential_type, Some(state), now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_days_until_expiration_rounds_up() {
        let now = Utc::now();
        let state = approved(Some(now + Duration::hours(25)));
        assert_eq!(days_until_expiration(Some(state), now), Some(2));

        let past = approved(Some(now - Duration::hours(30)));
        assert_eq!(days_until_expiration(Some(past), now), Some(-1));

        assert_eq!(days_until_expiration(Some(approved(None)), now), None);
        assert_eq!(days_until_expiration(None, now), None);
    }

    #[test]
    fn test_can_submit_rules() {
        let credential_type =
            fixtures::credential_type(Uuid::new_v4(), CredentialCategory::Driver);
        assert!(can_submit(&credential_type, CredentialStatus::NotSubmitted));
        assert!(can_submit(&credential_type, CredentialStatus::Rejected));
        assert!(can_submit(&credential_type, CredentialStatus::Expired));
        assert!(can_submit(&credential_type, CredentialStatus::Approved));
        assert!(!can_submit(&credential_type, CredentialStatus::PendingReview));

        let mut admin_type = credential_type;
        admin_type.submission_type = SubmissionType::AdminVerified;
        assert!(!can_submit(&admin_type, CredentialStatus::NotSubmitted));
    }
}
