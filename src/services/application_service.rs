//! Validación de la solicitud de conductor
//!
//! Reglas de negocio evaluadas en el servidor (la única copia de confianza)
//! antes de escribir nada: mayoría de edad, licencia vigente, campos
//! obligatorios y bloqueo de solicitudes duplicadas.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::dto::application_dto::{ApplicationSubmission, LicenseInfo, PersonalInfo};
use crate::models::driver::{Driver, EmploymentType};
use crate::models::vehicle::VehicleType;
use crate::utils::errors::AppError;

/// Milisegundos de un año (365 días), el mismo divisor que usa el formulario
const YEAR_IN_MS: i64 = 31_536_000_000;

const MINIMUM_AGE: i64 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("Missing required fields")]
    MissingField(&'static str),

    #[error("Applicant must be 18 or older")]
    Underage,

    #[error("License must not be expired")]
    LicenseExpired,

    #[error("Invalid vehicle type")]
    InvalidVehicleType,

    #[error("Application already exists")]
    DuplicateApplication,
}

impl From<ApplicationError> for AppError {
    fn from(error: ApplicationError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

/// Vehículo propio declarado por un solicitante 1099
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedVehicle {
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: String,
}

/// Payload validado: todos los campos obligatorios presentes y las fechas
/// ya parseadas. Solo se construye a través de `validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidApplication {
    pub company_id: Uuid,
    pub personal_info: PersonalInfo,
    pub date_of_birth: NaiveDate,
    pub employment_type: EmploymentType,
    pub license: LicenseInfo,
    pub license_expiration: NaiveDate,
    pub vehicle: Option<OwnedVehicle>,
    pub experience_notes: Option<String>,
    pub referral_source: Option<String>,
    pub eula_version: String,
}

/// Valida el payload contra el estado actual del conductor (si existe).
/// Función pura: `now` llega como parámetro.
pub fn validate(
    payload: &ApplicationSubmission,
    existing_driver: Option<&Driver>,
    now: DateTime<Utc>,
) -> Result<ValidApplication, ApplicationError> {
    let company_id = payload
        .company_id
        .ok_or(ApplicationError::MissingField("companyId"))?;
    let personal_info = payload
        .personal_info
        .clone()
        .ok_or(ApplicationError::MissingField("personalInfo"))?;
    let employment_type = payload
        .employment_type
        .ok_or(ApplicationError::MissingField("employmentType"))?;
    let license = payload
        .license
        .clone()
        .ok_or(ApplicationError::MissingField("license"))?;
    let eula_version = payload
        .eula_version
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ApplicationError::MissingField("eulaVersion"))?;

    // Edad: floor(ms desde el nacimiento / ms por año). Fecha imposible de
    // parsear cuenta como menor de edad.
    let date_of_birth = parse_date(&personal_info.date_of_birth).ok_or(ApplicationError::Underage)?;
    if age_in_years(date_of_birth, now) < MINIMUM_AGE {
        return Err(ApplicationError::Underage);
    }

    let license_expiration =
        parse_date(&license.expiration).ok_or(ApplicationError::LicenseExpired)?;
    if start_of_day(license_expiration) <= now {
        return Err(ApplicationError::LicenseExpired);
    }

    if let Some(driver) = existing_driver {
        if driver.blocks_resubmission(now) {
            return Err(ApplicationError::DuplicateApplication);
        }
    }

    // El vehículo solo forma parte de la solicitud para contratistas 1099
    let vehicle = match (&payload.vehicle, employment_type) {
        (Some(info), EmploymentType::C1099) => {
            let vehicle_type = VehicleType::from_wire(&info.vehicle_type)
                .ok_or(ApplicationError::InvalidVehicleType)?;
            Some(OwnedVehicle {
                vehicle_type,
                make: info.make.clone(),
                model: info.model.clone(),
                year: info.year,
                license_plate: info.license_plate.clone(),
                color: info.color.clone().unwrap_or_else(|| "Unknown".to_string()),
            })
        }
        _ => None,
    };

    Ok(ValidApplication {
        company_id,
        date_of_birth,
        personal_info,
        employment_type,
        license_expiration,
        license,
        vehicle,
        experience_notes: payload.experience_notes.clone(),
        referral_source: payload.referral_source.clone(),
        eula_version,
    })
}

pub fn age_in_years(date_of_birth: NaiveDate, now: DateTime<Utc>) -> i64 {
    let elapsed_ms = (now - start_of_day(date_of_birth)).num_milliseconds();
    elapsed_ms / YEAR_IN_MS
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::application_dto::AddressInfo;
    use crate::eligibility::fixtures;
    use crate::models::driver::ApplicationStatus;
    use chrono::Duration;

    fn base_payload(now: DateTime<Utc>) -> ApplicationSubmission {
        let dob = (now - Duration::days(365 * 30)).date_naive();
        let license_exp = (now + Duration::days(365 * 2)).date_naive();

        ApplicationSubmission {
            company_id: Some(Uuid::new_v4()),
            personal_info: Some(PersonalInfo {
                full_name: "Dana Fields".to_string(),
                phone: "6145550142".to_string(),
                date_of_birth: dob.format("%Y-%m-%d").to_string(),
                address: AddressInfo {
                    line1: "44 Oak Ave".to_string(),
                    line2: None,
                    city: "Columbus".to_string(),
                    state: "OH".to_string(),
                    zip: "43004".to_string(),
                },
            }),
            employment_type: Some(EmploymentType::W2),
            license: Some(LicenseInfo {
                number: "DL445566".to_string(),
                state: "OH".to_string(),
                expiration: license_exp.format("%Y-%m-%d").to_string(),
                front_url: "uploads/front.jpg".to_string(),
                back_url: "uploads/back.jpg".to_string(),
            }),
            vehicle: None,
            experience_notes: None,
            referral_source: None,
            eula_version: Some("2025-11".to_string()),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let now = Utc::now();
        let result = validate(&base_payload(now), None, now);
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let now = Utc::now();

        let mut payload = base_payload(now);
        payload.company_id = None;
        assert_eq!(
            validate(&payload, None, now),
            Err(ApplicationError::MissingField("companyId"))
        );

        let mut payload = base_payload(now);
        payload.personal_info = None;
        assert_eq!(
            validate(&payload, None, now),
            Err(ApplicationError::MissingField("personalInfo"))
        );

        let mut payload = base_payload(now);
        payload.employment_type = None;
        assert_eq!(
            validate(&payload, None, now),
            Err(ApplicationError::MissingField("employmentType"))
        );

        let mut payload = base_payload(now);
        payload.license = None;
        assert_eq!(
            validate(&payload, None, now),
            Err(ApplicationError::MissingField("license"))
        );

        let mut payload = base_payload(now);
        payload.eula_version = Some("  ".to_string());
        assert_eq!(
            validate(&payload, None, now),
            Err(ApplicationError::MissingField("eulaVersion"))
        );
    }

    #[test]
    fn test_seventeen_year_old_is_underage() {
        // Scenario C: fecha de nacimiento 17 años antes del envío
        let now = Utc::now();
        let mut payload = base_payload(now);
        let dob = (now - Duration::days(17 * 365)).date_naive();
        payload.personal_info.as_mut().unwrap().date_of_birth =
            dob.format("%Y-%m-%d").to_string();

        assert_eq!(validate(&payload, None, now), Err(ApplicationError::Underage));
    }

    #[test]
    fn test_unparseable_dob_is_underage() {
        let now = Utc::now();
        let mut payload = base_payload(now);
        payload.personal_info.as_mut().unwrap().date_of_birth = "04/20/1990".to_string();

        assert_eq!(validate(&payload, None, now), Err(ApplicationError::Underage));
    }

    #[test]
    fn test_eighteen_years_plus_margin_passes() {
        let now = Utc::now();
        let mut payload = base_payload(now);
        // 18 años de 365 días más una semana de margen sobre el divisor
        let dob = (now - Duration::days(18 * 365 + 7)).date_naive();
        payload.personal_info.as_mut().unwrap().date_of_birth =
            dob.format("%Y-%m-%d").to_string();

        assert!(validate(&payload, None, now).is_ok());
    }

    #[test]
    fn test_expired_license_rejected() {
        let now = Utc::now();
        let mut payload = base_payload(now);
        let expired = (now - Duration::days(1)).date_naive();
        payload.license.as_mut().unwrap().expiration = expired.format("%Y-%m-%d").to_string();

        assert_eq!(validate(&payload, None, now), Err(ApplicationError::LicenseExpired));
    }

    #[test]
    fn test_license_expiring_today_rejected() {
        // La medianoche de hoy ya pasó: expiration <= now
        let now = Utc::now();
        let mut payload = base_payload(now);
        payload.license.as_mut().unwrap().expiration =
            now.date_naive().format("%Y-%m-%d").to_string();

        assert_eq!(validate(&payload, None, now), Err(ApplicationError::LicenseExpired));
    }

    #[test]
    fn test_pending_application_is_duplicate() {
        let now = Utc::now();
        let payload = base_payload(now);
        let mut driver = fixtures::driver(
            payload.company_id.unwrap(),
            EmploymentType::W2,
            "OH",
        );
        driver.application_status = ApplicationStatus::Pending;

        assert_eq!(
            validate(&payload, Some(&driver), now),
            Err(ApplicationError::DuplicateApplication)
        );
    }

    #[test]
    fn test_rejected_with_elapsed_window_can_reapply() {
        let now = Utc::now();
        let payload = base_payload(now);
        let mut driver = fixtures::driver(
            payload.company_id.unwrap(),
            EmploymentType::W2,
            "OH",
        );
        driver.application_status = ApplicationStatus::Rejected;
        driver.can_reapply_at = Some(now - Duration::days(1));

        assert!(validate(&payload, Some(&driver), now).is_ok());
    }

    #[test]
    fn test_vehicle_only_kept_for_1099() {
        let now = Utc::now();
        let mut payload = base_payload(now);
        payload.vehicle = Some(crate::dto::application_dto::VehicleInfo {
            vehicle_type: "stretcher".to_string(),
            make: "Ford".to_string(),
            model: "Transit".to_string(),
            year: 2021,
            license_plate: "HJK4821".to_string(),
            color: None,
        });

        // w2: el vehículo se ignora
        let valid = validate(&payload, None, now).unwrap();
        assert!(valid.vehicle.is_none());

        // 1099: se normaliza el alias y el color ausente
        payload.employment_type = Some(EmploymentType::C1099);
        let valid = validate(&payload, None, now).unwrap();
        let vehicle = valid.vehicle.unwrap();
        assert_eq!(vehicle.vehicle_type, VehicleType::StretcherVan);
        assert_eq!(vehicle.color, "Unknown");
    }

    #[test]
    fn test_unknown_vehicle_type_rejected() {
        let now = Utc::now();
        let mut payload = base_payload(now);
        payload.employment_type = Some(EmploymentType::C1099);
        payload.vehicle = Some(crate::dto::application_dto::VehicleInfo {
            vehicle_type: "hovercraft".to_string(),
            make: "Ford".to_string(),
            model: "Transit".to_string(),
            year: 2021,
            license_plate: "HJK4821".to_string(),
            color: None,
        });

        assert_eq!(
            validate(&payload, None, now),
            Err(ApplicationError::InvalidVehicleType)
        );
    }

    #[test]
    fn test_age_in_years_floors() {
        let now = Utc::now();
        let dob = (now - Duration::days(17 * 365 + 300)).date_naive();
        assert_eq!(age_in_years(dob, now), 17);
    }
}
