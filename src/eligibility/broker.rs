//! BrokerEligibilityEvaluator
//!
//! Combina zona de servicio, tipos de empleo/vehículo aceptados y el
//! RequirementAggregator para decidir si un conductor (y opcionalmente un
//! vehículo) puede unirse a un broker, con motivos legibles cuando no puede.
//!
//! Los chequeos estructurales del conductor (broker activo, tipo de empleo,
//! zona de servicio) cortan en el primer fallo; los chequeos de credenciales
//! del vehículo y del conductor acumulan todos los motivos para mostrarlos.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::eligibility::aggregator;
use crate::eligibility::matcher::{RequirementScope, Subject};
use crate::eligibility::status::InstanceState;
use crate::models::broker::{Broker, BrokerStatus, JoinMode};
use crate::models::credential::{CredentialCategory, CredentialType};
use crate::models::driver::Driver;
use crate::models::vehicle::{Vehicle, VehicleStatus};

/// Vehículo candidato con sus instancias de credencial indexadas por tipo
#[derive(Debug, Clone, Copy)]
pub struct VehicleCandidate<'a> {
    pub vehicle: &'a Vehicle,
    pub credentials: &'a HashMap<Uuid, InstanceState>,
}

/// Veredicto de elegibilidad para mostrar y para decidir escrituras
#[derive(Debug)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub join_mode: JoinMode,
    pub reasons: Vec<String>,
}

/// Cómo se une un conductor a este broker. Depende solo de la configuración
/// del broker, no del booleano de elegibilidad: un broker puede exigir
/// asignación manual aunque el conductor cumpla todos los requisitos.
pub fn join_mode(broker: &Broker) -> JoinMode {
    if broker.status != BrokerStatus::Active {
        return JoinMode::NotEligible;
    }
    if broker.allow_driver_auto_signup {
        JoinMode::AutoSignup
    } else if broker.allow_driver_requests {
        JoinMode::Request
    } else {
        JoinMode::AdminOnly
    }
}

pub fn evaluate(
    driver: &Driver,
    vehicle: Option<VehicleCandidate<'_>>,
    broker: &Broker,
    credential_types: &[CredentialType],
    driver_credentials: &HashMap<Uuid, InstanceState>,
    now: DateTime<Utc>,
) -> EligibilityReport {
    let mode = join_mode(broker);

    // 1. Broker activo: cualquier otra cosa es irrelevante
    if broker.status != BrokerStatus::Active {
        return failed(mode, "Trip source is not active".to_string());
    }

    // 2. Tipo de empleo aceptado (lista vacía = todos)
    if !broker.accepted_employment_types.is_empty()
        && !broker
            .accepted_employment_types
            .contains(&driver.employment_type)
    {
        return failed(
            mode,
            format!(
                "Employment type ({}) not accepted",
                driver.employment_type.as_str()
            ),
        );
    }

    // 3. Zona de servicio (lista vacía = todos los estados)
    if !broker.service_states.is_empty()
        && !broker.service_states.iter().any(|s| s == &driver.state)
    {
        return failed(mode, format!("Not in service area ({})", driver.state));
    }

    let scope = RequirementScope::Broker(broker.id);
    let mut reasons = Vec::new();

    // 4. Vehículo: acumula todos los motivos, no solo el primero
    if let Some(candidate) = vehicle {
        let v = candidate.vehicle;
        if !broker.accepted_vehicle_types.contains(&v.vehicle_type) {
            reasons.push(format!(
                "Vehicle type ({}) not accepted",
                v.vehicle_type.as_str()
            ));
        }
        if v.status != VehicleStatus::Active {
            reasons.push("Vehicle is not active".to_string());
        }

        let subject = Subject::vehicle(v.company_id, v.vehicle_type);
        let outcome = aggregator::is_satisfied(
            credential_types,
            CredentialCategory::Vehicle,
            candidate.credentials,
            &subject,
            scope,
            now,
        );
        if !outcome.satisfied {
            reasons.push(missing_reason(outcome.missing.len(), "vehicle"));
        }
    }

    // 5. Credenciales del conductor (globales + del broker)
    let subject = Subject::driver(driver.company_id, driver.employment_type);
    let outcome = aggregator::is_satisfied(
        credential_types,
        CredentialCategory::Driver,
        driver_credentials,
        &subject,
        scope,
        now,
    );
    if !outcome.satisfied {
        reasons.push(missing_reason(outcome.missing.len(), "driver"));
    }

    EligibilityReport {
        eligible: reasons.is_empty(),
        join_mode: mode,
        reasons,
    }
}

fn failed(mode: JoinMode, reason: String) -> EligibilityReport {
    EligibilityReport {
        eligible: false,
        join_mode: mode,
        reasons: vec![reason],
    }
}

fn missing_reason(count: usize, category: &str) -> String {
    format!(
        "{} {} credential{} missing",
        count,
        category,
        if count == 1 { "" } else { "s" }
    )
}
