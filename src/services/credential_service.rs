//! Resolución de credenciales para un sujeto
//!
//! Combina los tipos aplicables con las instancias existentes (añadiendo
//! placeholders not_submitted para los tipos nunca tocados), calcula el
//! estado derivado de cada una y el resumen de progreso. Lógica pura; los
//! controllers aportan los datos.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::eligibility::{self, InstanceState, RequirementScope, Subject};
use crate::models::credential::{
    CredentialCategory, CredentialProgressSummary, CredentialRecord, CredentialStatus,
    CredentialType, DisplayStatus, ExpirationType, RequirementLevel, ResolvedCredentialResponse,
};

/// Tipos que aplican al sujeto en alcance global o en el de alguno de los
/// brokers asignados, en orden de presentación.
pub fn applicable_types(
    credential_types: &[CredentialType],
    category: CredentialCategory,
    subject: &Subject,
    assigned_broker_ids: &[Uuid],
) -> Vec<CredentialType> {
    let mut result: Vec<CredentialType> = credential_types
        .iter()
        .filter(|ty| ty.category == category)
        .filter(|ty| {
            eligibility::applies(ty, subject, RequirementScope::Global)
                || assigned_broker_ids
                    .iter()
                    .any(|id| eligibility::applies(ty, subject, RequirementScope::Broker(*id)))
        })
        .cloned()
        .collect();

    result.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    result
}

/// Une tipos aplicables con sus instancias; los tipos sin instancia salen
/// como placeholder not_submitted.
pub fn resolve_for_subject(
    applicable: &[CredentialType],
    records: &[CredentialRecord],
    now: DateTime<Utc>,
) -> Vec<ResolvedCredentialResponse> {
    let by_type: HashMap<Uuid, &CredentialRecord> = records
        .iter()
        .map(|record| (record.credential_type_id, record))
        .collect();

    applicable
        .iter()
        .map(|credential_type| {
            let record = by_type.get(&credential_type.id).copied();
            resolve_one(credential_type, record, now)
        })
        .collect()
}

fn resolve_one(
    credential_type: &CredentialType,
    record: Option<&CredentialRecord>,
    now: DateTime<Utc>,
) -> ResolvedCredentialResponse {
    let instance = record.map(InstanceState::from);
    let display_status = eligibility::resolve(credential_type, instance, now);
    let stored_status = record.map(|r| r.status).unwrap_or(CredentialStatus::NotSubmitted);

    ResolvedCredentialResponse {
        credential_id: record.map(|r| r.id),
        status: stored_status,
        display_status,
        days_until_expiration: eligibility::days_until_expiration(instance, now),
        is_expiring_soon: display_status == DisplayStatus::Expiring,
        can_submit: eligibility::status::can_submit(credential_type, stored_status),
        expires_at: record.and_then(|r| r.expires_at),
        submitted_at: record.and_then(|r| r.submitted_at),
        rejection_reason: record.and_then(|r| r.rejection_reason.clone()),
        credential_type: credential_type.clone(),
    }
}

/// Resumen de progreso sobre las credenciales requeridas
pub fn progress(credentials: &[ResolvedCredentialResponse]) -> CredentialProgressSummary {
    let required: Vec<&ResolvedCredentialResponse> = credentials
        .iter()
        .filter(|c| c.credential_type.requirement == RequirementLevel::Required)
        .collect();

    let complete = required
        .iter()
        .filter(|c| c.display_status == DisplayStatus::Approved)
        .count();
    let pending = required
        .iter()
        .filter(|c| {
            matches!(
                c.display_status,
                DisplayStatus::PendingReview | DisplayStatus::AwaitingVerification
            )
        })
        .count();
    let action_needed = required
        .iter()
        .filter(|c| {
            matches!(
                c.display_status,
                DisplayStatus::NotSubmitted
                    | DisplayStatus::Rejected
                    | DisplayStatus::Expired
                    | DisplayStatus::Expiring
            )
        })
        .count();

    let percentage = if required.is_empty() {
        100
    } else {
        ((complete as f64 / required.len() as f64) * 100.0).round() as u32
    };

    CredentialProgressSummary {
        total: required.len(),
        complete,
        pending,
        action_needed,
        percentage,
    }
}

/// Fecha de caducidad al aprobar, según la política del tipo
pub fn compute_expires_at(
    credential_type: &CredentialType,
    record: &CredentialRecord,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match credential_type.expiration_type {
        ExpirationType::Never => None,
        ExpirationType::FixedInterval => credential_type
            .expiration_interval_days
            .map(|days| now + Duration::days(days as i64)),
        ExpirationType::DriverSpecified => record
            .driver_expiration_date
            .or(record.entered_date)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::fixtures;
    use crate::models::credential::{CredentialScope, SubmissionType};
    use crate::models::driver::EmploymentType;
    use chrono::NaiveDate;

    fn record_for(
        credential_type: &CredentialType,
        status: CredentialStatus,
    ) -> CredentialRecord {
        CredentialRecord {
            id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            credential_type_id: credential_type.id,
            company_id: credential_type.company_id,
            status,
            document_urls: None,
            signature_data: None,
            form_data: None,
            entered_date: None,
            driver_expiration_date: None,
            notes: None,
            expires_at: None,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            review_notes: None,
            rejection_reason: None,
            submission_version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_applicable_types_includes_assigned_broker_scope() {
        let company_id = Uuid::new_v4();
        let broker_id = Uuid::new_v4();
        let other_broker = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);

        let global = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let mut own_broker = fixtures::credential_type(company_id, CredentialCategory::Driver);
        own_broker.scope = CredentialScope::Broker;
        own_broker.broker_id = Some(broker_id);
        let mut foreign_broker = fixtures::credential_type(company_id, CredentialCategory::Driver);
        foreign_broker.scope = CredentialScope::Broker;
        foreign_broker.broker_id = Some(other_broker);

        let all = vec![global.clone(), own_broker.clone(), foreign_broker];
        let applicable = applicable_types(&all, CredentialCategory::Driver, &subject, &[broker_id]);

        let ids: Vec<Uuid> = applicable.iter().map(|t| t.id).collect();
        assert!(ids.contains(&global.id));
        assert!(ids.contains(&own_broker.id));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_resolve_adds_placeholder_for_untouched_types() {
        let company_id = Uuid::new_v4();
        let submitted = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let untouched = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let record = record_for(&submitted, CredentialStatus::PendingReview);

        let resolved = resolve_for_subject(
            &[submitted.clone(), untouched.clone()],
            &[record.clone()],
            Utc::now(),
        );

        assert_eq!(resolved.len(), 2);
        let submitted_row = resolved
            .iter()
            .find(|c| c.credential_type.id == submitted.id)
            .unwrap();
        assert_eq!(submitted_row.credential_id, Some(record.id));
        assert_eq!(submitted_row.display_status, DisplayStatus::PendingReview);
        assert!(!submitted_row.can_submit);

        let placeholder = resolved
            .iter()
            .find(|c| c.credential_type.id == untouched.id)
            .unwrap();
        assert_eq!(placeholder.credential_id, None);
        assert_eq!(placeholder.display_status, DisplayStatus::NotSubmitted);
        assert!(placeholder.can_submit);
    }

    #[test]
    fn test_progress_counts_by_display_status() {
        let company_id = Uuid::new_v4();
        let approved_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let pending_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let rejected_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let mut optional_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        optional_type.requirement = RequirementLevel::Optional;

        let records = vec![
            record_for(&approved_type, CredentialStatus::Approved),
            record_for(&pending_type, CredentialStatus::PendingReview),
            record_for(&rejected_type, CredentialStatus::Rejected),
        ];
        let types = vec![approved_type, pending_type, rejected_type, optional_type];
        let resolved = resolve_for_subject(&types, &records, Utc::now());

        let summary = progress(&resolved);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.complete, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.action_needed, 1);
        assert_eq!(summary.percentage, 33);
    }

    #[test]
    fn test_progress_empty_set_is_complete() {
        let summary = progress(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percentage, 100);
    }

    #[test]
    fn test_awaiting_verification_counts_as_pending() {
        let company_id = Uuid::new_v4();
        let mut admin_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        admin_type.submission_type = SubmissionType::AdminVerified;

        let resolved = resolve_for_subject(&[admin_type], &[], Utc::now());
        assert_eq!(resolved[0].display_status, DisplayStatus::AwaitingVerification);

        let summary = progress(&resolved);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.action_needed, 0);
    }

    #[test]
    fn test_compute_expires_at_policies() {
        let company_id = Uuid::new_v4();
        let now = Utc::now();

        let never = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let record = record_for(&never, CredentialStatus::PendingReview);
        assert_eq!(compute_expires_at(&never, &record, now), None);

        let mut fixed = fixtures::credential_type(company_id, CredentialCategory::Driver);
        fixed.expiration_type = ExpirationType::FixedInterval;
        fixed.expiration_interval_days = Some(30);
        let expires = compute_expires_at(&fixed, &record, now).unwrap();
        assert_eq!(expires, now + Duration::days(30));

        let mut driver_specified = fixtures::credential_type(company_id, CredentialCategory::Driver);
        driver_specified.expiration_type = ExpirationType::DriverSpecified;
        let mut dated = record_for(&driver_specified, CredentialStatus::PendingReview);
        dated.driver_expiration_date = NaiveDate::from_ymd_opt(2027, 3, 15);
        let expires = compute_expires_at(&driver_specified, &dated, now).unwrap();
        assert_eq!(expires.date_naive(), NaiveDate::from_ymd_opt(2027, 3, 15).unwrap());

        // Sin fecha declarada cae a entered_date (credenciales date_entry)
        dated.driver_expiration_date = None;
        dated.entered_date = NaiveDate::from_ymd_opt(2026, 12, 1);
        let expires = compute_expires_at(&driver_specified, &dated, now).unwrap();
        assert_eq!(expires.date_naive(), NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
    }
}
