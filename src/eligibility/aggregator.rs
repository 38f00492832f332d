//! RequirementAggregator
//!
//! Decide si un sujeto satisface un conjunto de requisitos: todos los tipos
//! `required` que le aplican deben resolver a approved. El mismo algoritmo
//! sirve para "puede activarse este conductor" y "es elegible este vehículo
//! para el broker B"; solo cambian la categoría, el alcance y las instancias.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::eligibility::matcher::{self, RequirementScope, Subject};
use crate::eligibility::status::{self, InstanceState};
use crate::models::credential::{
    CredentialCategory, CredentialType, DisplayStatus, RequirementLevel,
};

/// Resultado del agregado: satisfecho + tipos que faltan por aprobar
#[derive(Debug)]
pub struct RequirementOutcome {
    pub satisfied: bool,
    pub missing: Vec<CredentialType>,
}

pub fn is_satisfied(
    credential_types: &[CredentialType],
    category: CredentialCategory,
    instances_by_type: &HashMap<Uuid, InstanceState>,
    subject: &Subject,
    scope: RequirementScope,
    now: DateTime<Utc>,
) -> RequirementOutcome {
    let mut missing = Vec::new();

    for credential_type in credential_types {
        if credential_type.category != category {
            continue;
        }
        if credential_type.requirement != RequirementLevel::Required {
            continue;
        }
        if !matcher::applies(credential_type, subject, scope) {
            continue;
        }

        let instance = instances_by_type.get(&credential_type.id).copied();
        if status::resolve(credential_type, instance, now) != DisplayStatus::Approved {
            missing.push(credential_type.clone());
        }
    }

    RequirementOutcome {
        satisfied: missing.is_empty(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::fixtures;
    use crate::models::credential::{CredentialStatus, RequirementLevel};
    use crate::models::driver::EmploymentType;

    fn approved_instance() -> InstanceState {
        InstanceState {
            status: CredentialStatus::Approved,
            expires_at: None,
        }
    }

    fn pending_instance() -> InstanceState {
        InstanceState {
            status: CredentialStatus::PendingReview,
            expires_at: None,
        }
    }

    #[test]
    fn test_empty_requirement_set_is_satisfied() {
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);
        let outcome = is_satisfied(
            &[],
            CredentialCategory::Driver,
            &HashMap::new(),
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(outcome.satisfied);
        assert!(outcome.missing.is_empty());
    }

    #[test]
    fn test_all_required_approved_is_satisfied() {
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);
        let first = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let second = fixtures::credential_type(company_id, CredentialCategory::Driver);

        let mut instances = HashMap::new();
        instances.insert(first.id, approved_instance());
        instances.insert(second.id, approved_instance());

        let outcome = is_satisfied(
            &[first, second],
            CredentialCategory::Driver,
            &instances,
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(outcome.satisfied);
    }

    #[test]
    fn test_missing_lists_unapproved_required_types() {
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);
        let approved_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let pending_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let untouched_type = fixtures::credential_type(company_id, CredentialCategory::Driver);

        let mut instances = HashMap::new();
        instances.insert(approved_type.id, approved_instance());
        instances.insert(pending_type.id, pending_instance());

        let outcome = is_satisfied(
            &[approved_type.clone(), pending_type.clone(), untouched_type.clone()],
            CredentialCategory::Driver,
            &instances,
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );

        assert!(!outcome.satisfied);
        let missing_ids: Vec<Uuid> = outcome.missing.iter().map(|t| t.id).collect();
        assert_eq!(missing_ids, vec![pending_type.id, untouched_type.id]);
    }

    #[test]
    fn test_optional_and_recommended_types_are_ignored() {
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);

        let mut optional = fixtures::credential_type(company_id, CredentialCategory::Driver);
        optional.requirement = RequirementLevel::Optional;
        let mut recommended = fixtures::credential_type(company_id, CredentialCategory::Driver);
        recommended.requirement = RequirementLevel::Recommended;

        let outcome = is_satisfied(
            &[optional, recommended],
            CredentialCategory::Driver,
            &HashMap::new(),
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(outcome.satisfied);
    }

    #[test]
    fn test_other_category_is_ignored() {
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);
        let vehicle_type = fixtures::credential_type(company_id, CredentialCategory::Vehicle);

        let outcome = is_satisfied(
            &[vehicle_type],
            CredentialCategory::Driver,
            &HashMap::new(),
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(outcome.satisfied);
    }

    #[test]
    fn test_adding_unapproved_type_never_satisfies() {
        // P4: añadir un tipo required no aprobado nunca pasa de false a true
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);
        let pending_type = fixtures::credential_type(company_id, CredentialCategory::Driver);

        let mut instances = HashMap::new();
        instances.insert(pending_type.id, pending_instance());

        let base = is_satisfied(
            &[pending_type.clone()],
            CredentialCategory::Driver,
            &instances,
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(!base.satisfied);

        let extra = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let extended = is_satisfied(
            &[pending_type, extra],
            CredentialCategory::Driver,
            &instances,
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(!extended.satisfied);
        assert_eq!(extended.missing.len(), 2);
    }

    #[test]
    fn test_leaving_missing_requires_approval() {
        // P4: un tipo solo sale de missing cuando resuelve a approved
        let company_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);
        let credential_type = fixtures::credential_type(company_id, CredentialCategory::Driver);

        let mut instances = HashMap::new();
        instances.insert(credential_type.id, pending_instance());
        let before = is_satisfied(
            &[credential_type.clone()],
            CredentialCategory::Driver,
            &instances,
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert_eq!(before.missing.len(), 1);

        instances.insert(credential_type.id, approved_instance());
        let after = is_satisfied(
            &[credential_type],
            CredentialCategory::Driver,
            &instances,
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(after.satisfied);
        assert!(after.missing.is_empty());
    }

    #[test]
    fn test_broker_scope_pulls_in_broker_types() {
        let company_id = Uuid::new_v4();
        let broker_id = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::W2);

        let mut broker_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        broker_type.scope = crate::models::credential::CredentialScope::Broker;
        broker_type.broker_id = Some(broker_id);

        let global_outcome = is_satisfied(
            &[broker_type.clone()],
            CredentialCategory::Driver,
            &HashMap::new(),
            &subject,
            RequirementScope::Global,
            Utc::now(),
        );
        assert!(global_outcome.satisfied, "broker type must not count globally");

        let broker_outcome = is_satisfied(
            &[broker_type],
            CredentialCategory::Driver,
            &HashMap::new(),
            &subject,
            RequirementScope::Broker(broker_id),
            Utc::now(),
        );
        assert!(!broker_outcome.satisfied);
    }
}
