//! Motor de elegibilidad y resolución de estados
//!
//! Única fuente de verdad para decidir qué tipos de credencial aplican a un
//! sujeto, en qué estado derivado está cada credencial y si un conductor o
//! vehículo puede unirse a un broker. Todas las funciones son puras: sin
//! I/O y sin leer el reloj; `now` siempre llega como parámetro.
//!
//! Tanto los endpoints de previsualización como los de escritura autoritativa
//! invocan este módulo, de forma que las dos vistas no pueden divergir.

pub mod aggregator;
pub mod broker;
pub mod matcher;
pub mod status;

pub use aggregator::{is_satisfied, RequirementOutcome};
pub use broker::{evaluate, join_mode, EligibilityReport, VehicleCandidate};
pub use matcher::{applies, RequirementScope, Subject};
pub use status::{days_until_expiration, resolve, InstanceState, DEFAULT_WARNING_DAYS};

#[cfg(test)]
pub(crate) mod fixtures {
    //! Constructores compartidos por los tests del motor.

    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::broker::{Broker, BrokerStatus};
    use crate::models::credential::{
        CredentialCategory, CredentialScope, CredentialType, EmploymentFilter, ExpirationType,
        RequirementLevel, SubmissionType,
    };
    use crate::models::driver::{
        ApplicationStatus, Driver, DriverStatus, EmploymentType,
    };
    use crate::models::vehicle::{Vehicle, VehicleOwnership, VehicleStatus, VehicleType};

    pub fn credential_type(company_id: Uuid, category: CredentialCategory) -> CredentialType {
        CredentialType {
            id: Uuid::new_v4(),
            company_id,
            name: "Background Check".to_string(),
            description: None,
            category,
            scope: CredentialScope::Global,
            broker_id: None,
            employment_type: EmploymentFilter::Both,
            requirement: RequirementLevel::Required,
            vehicle_types: None,
            submission_type: SubmissionType::DocumentUpload,
            expiration_type: ExpirationType::Never,
            expiration_interval_days: None,
            expiration_warning_days: 30,
            grace_period_days: 0,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        }
    }

    pub fn driver(company_id: Uuid, employment_type: EmploymentType, state: &str) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_id,
            employment_type,
            application_status: ApplicationStatus::Approved,
            status: DriverStatus::Active,
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1988, 3, 2).unwrap(),
            address_line1: "10 Elm St".to_string(),
            address_line2: None,
            city: "Dayton".to_string(),
            state: state.to_string(),
            zip: "45402".to_string(),
            license_number: "DL900123".to_string(),
            license_state: state.to_string(),
            license_expiration: chrono::NaiveDate::from_ymd_opt(2031, 6, 30).unwrap(),
            license_front_url: None,
            license_back_url: None,
            experience_notes: None,
            referral_source: None,
            application_date: None,
            application_submitted_at: None,
            rejection_reason: None,
            rejected_at: None,
            can_reapply_at: None,
            eula_accepted_at: None,
            eula_version: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn vehicle(company_id: Uuid, vehicle_type: VehicleType) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            company_id,
            make: "Toyota".to_string(),
            model: "Sienna".to_string(),
            year: 2022,
            color: Some("White".to_string()),
            license_plate: "ABC1234".to_string(),
            license_state: Some("OH".to_string()),
            vehicle_type,
            ownership: VehicleOwnership::Company,
            owner_driver_id: None,
            status: VehicleStatus::Active,
            status_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn broker(company_id: Uuid) -> Broker {
        Broker {
            id: Uuid::new_v4(),
            company_id,
            name: "MedRide Network".to_string(),
            code: Some("MRN".to_string()),
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            website: None,
            contract_number: None,
            notes: None,
            service_states: vec![],
            accepted_vehicle_types: vec![
                VehicleType::Sedan,
                VehicleType::Minivan,
                VehicleType::WheelchairVan,
            ],
            accepted_employment_types: vec![],
            allow_driver_requests: true,
            allow_driver_auto_signup: false,
            status: BrokerStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        }
    }
}
