//! CredentialTypeMatcher
//!
//! Predicado puro: decide si un tipo de credencial aplica a un sujeto
//! (conductor o vehículo) dentro de un alcance de evaluación concreto.

use uuid::Uuid;

use crate::models::credential::{
    CredentialCategory, CredentialScope, CredentialType, EmploymentFilter,
};
use crate::models::driver::EmploymentType;
use crate::models::vehicle::VehicleType;

/// Sujeto de la evaluación. Un conductor lleva employment_type; un vehículo
/// lleva vehicle_type. Sin employment_type el filtro de empleo siempre
/// coincide (contextos solo-vehículo).
#[derive(Debug, Clone, Copy)]
pub struct Subject {
    pub company_id: Uuid,
    pub employment_type: Option<EmploymentType>,
    pub vehicle_type: Option<VehicleType>,
}

impl Subject {
    pub fn driver(company_id: Uuid, employment_type: EmploymentType) -> Self {
        Self {
            company_id,
            employment_type: Some(employment_type),
            vehicle_type: None,
        }
    }

    pub fn vehicle(company_id: Uuid, vehicle_type: VehicleType) -> Self {
        Self {
            company_id,
            employment_type: None,
            vehicle_type: Some(vehicle_type),
        }
    }
}

/// Alcance contextual de la evaluación: requisitos globales, o requisitos
/// para un broker concreto (globales + los del broker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementScope {
    Global,
    Broker(Uuid),
}

/// Todas las reglas deben cumplirse. Sin efectos secundarios.
pub fn applies(credential_type: &CredentialType, subject: &Subject, scope: RequirementScope) -> bool {
    if credential_type.company_id != subject.company_id {
        return false;
    }
    if !credential_type.is_active {
        return false;
    }
    if !employment_matches(credential_type.employment_type, subject.employment_type) {
        return false;
    }
    if credential_type.category == CredentialCategory::Vehicle
        && !vehicle_type_matches(credential_type.vehicle_types.as_deref(), subject.vehicle_type)
    {
        return false;
    }
    scope_matches(credential_type, scope)
}

fn employment_matches(filter: EmploymentFilter, subject: Option<EmploymentType>) -> bool {
    // Sujeto sin tipo de empleo: coincide siempre
    let Some(employment) = subject else {
        return true;
    };
    match filter {
        EmploymentFilter::Both => true,
        EmploymentFilter::W2Only => employment == EmploymentType::W2,
        EmploymentFilter::C1099Only => employment == EmploymentType::C1099,
    }
}

fn vehicle_type_matches(allowed: Option<&[VehicleType]>, subject: Option<VehicleType>) -> bool {
    // None o lista vacía = todos los tipos coinciden
    let Some(allowed) = allowed else {
        return true;
    };
    if allowed.is_empty() {
        return true;
    }
    match subject {
        Some(vehicle_type) => allowed.contains(&vehicle_type),
        None => false,
    }
}

fn scope_matches(credential_type: &CredentialType, scope: RequirementScope) -> bool {
    match scope {
        RequirementScope::Global => credential_type.scope == CredentialScope::Global,
        RequirementScope::Broker(broker_id) => {
            credential_type.scope == CredentialScope::Global
                || (credential_type.scope == CredentialScope::Broker
                    && credential_type.broker_id == Some(broker_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::fixtures;
    use crate::models::credential::CredentialScope;

    #[test]
    fn test_company_mismatch_never_applies() {
        let company_id = Uuid::new_v4();
        let credential_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        let subject = Subject::driver(Uuid::new_v4(), EmploymentType::W2);
        assert!(!applies(&credential_type, &subject, RequirementScope::Global));
    }

    #[test]
    fn test_inactive_type_never_applies() {
        let company_id = Uuid::new_v4();
        let mut credential_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        credential_type.is_active = false;
        let subject = Subject::driver(company_id, EmploymentType::W2);
        assert!(!applies(&credential_type, &subject, RequirementScope::Global));
    }

    #[test]
    fn test_employment_filter_truth_table() {
        // both -> siempre; w2_only -> solo w2; 1099_only -> solo 1099
        let cases = [
            (EmploymentFilter::Both, EmploymentType::W2, true),
            (EmploymentFilter::Both, EmploymentType::C1099, true),
            (EmploymentFilter::W2Only, EmploymentType::W2, true),
            (EmploymentFilter::W2Only, EmploymentType::C1099, false),
            (EmploymentFilter::C1099Only, EmploymentType::W2, false),
            (EmploymentFilter::C1099Only, EmploymentType::C1099, true),
        ];

        let company_id = Uuid::new_v4();
        for (filter, employment, expected) in cases {
            let mut credential_type =
                fixtures::credential_type(company_id, CredentialCategory::Driver);
            credential_type.employment_type = filter;
            let subject = Subject::driver(company_id, employment);
            assert_eq!(
                applies(&credential_type, &subject, RequirementScope::Global),
                expected,
                "filter {:?} vs employment {:?}",
                filter,
                employment
            );
        }
    }

    #[test]
    fn test_missing_employment_always_matches() {
        let company_id = Uuid::new_v4();
        for filter in [
            EmploymentFilter::Both,
            EmploymentFilter::W2Only,
            EmploymentFilter::C1099Only,
        ] {
            let mut credential_type =
                fixtures::credential_type(company_id, CredentialCategory::Vehicle);
            credential_type.employment_type = filter;
            let subject = Subject::vehicle(company_id, VehicleType::Sedan);
            assert!(applies(&credential_type, &subject, RequirementScope::Global));
        }
    }

    #[test]
    fn test_vehicle_type_filter_excludes_other_types() {
        let company_id = Uuid::new_v4();
        let mut credential_type = fixtures::credential_type(company_id, CredentialCategory::Vehicle);
        credential_type.vehicle_types = Some(vec![VehicleType::WheelchairVan]);

        let sedan = Subject::vehicle(company_id, VehicleType::Sedan);
        assert!(!applies(&credential_type, &sedan, RequirementScope::Global));

        let wheelchair_van = Subject::vehicle(company_id, VehicleType::WheelchairVan);
        assert!(applies(&credential_type, &wheelchair_van, RequirementScope::Global));
    }

    #[test]
    fn test_empty_vehicle_type_list_matches_all() {
        let company_id = Uuid::new_v4();
        let mut credential_type = fixtures::credential_type(company_id, CredentialCategory::Vehicle);
        credential_type.vehicle_types = Some(vec![]);

        let subject = Subject::vehicle(company_id, VehicleType::StretcherVan);
        assert!(applies(&credential_type, &subject, RequirementScope::Global));

        credential_type.vehicle_types = None;
        assert!(applies(&credential_type, &subject, RequirementScope::Global));
    }

    #[test]
    fn test_global_scope_excludes_broker_types() {
        let company_id = Uuid::new_v4();
        let broker_id = Uuid::new_v4();
        let mut credential_type = fixtures::credential_type(company_id, CredentialCategory::Driver);
        credential_type.scope = CredentialScope::Broker;
        credential_type.broker_id = Some(broker_id);

        let subject = Subject::driver(company_id, EmploymentType::W2);
        assert!(!applies(&credential_type, &subject, RequirementScope::Global));
        assert!(applies(&credential_type, &subject, RequirementScope::Broker(broker_id)));
    }

    #[test]
    fn test_broker_scope_includes_global_and_own_types_only() {
        let company_id = Uuid::new_v4();
        let broker_a = Uuid::new_v4();
        let broker_b = Uuid::new_v4();
        let subject = Subject::driver(company_id, EmploymentType::C1099);

        let global = fixtures::credential_type(company_id, CredentialCategory::Driver);
        assert!(applies(&global, &subject, RequirementScope::Broker(broker_a)));

        let mut scoped = fixtures::credential_type(company_id, CredentialCategory::Driver);
        scoped.scope = CredentialScope::Broker;
        scoped.broker_id = Some(broker_b);
        assert!(!applies(&scoped, &subject, RequirementScope::Broker(broker_a)));
        assert!(applies(&scoped, &subject, RequirementScope::Broker(broker_b)));
    }
}
