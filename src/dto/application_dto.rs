//! DTOs de la solicitud de conductor
//!
//! El payload llega en camelCase desde el formulario web. Los campos
//! obligatorios son Option en el borde para poder responder 400 con
//! "Missing required fields" en vez de un error de deserialización opaco.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::EmploymentType;

/// Payload de envío de solicitud
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub company_id: Option<Uuid>,
    pub personal_info: Option<PersonalInfo>,
    pub employment_type: Option<EmploymentType>,
    pub license: Option<LicenseInfo>,
    pub vehicle: Option<VehicleInfo>,
    pub experience_notes: Option<String>,
    pub referral_source: Option<String>,
    pub eula_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub phone: String,
    /// YYYY-MM-DD
    pub date_of_birth: String,
    pub address: AddressInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub number: String,
    pub state: String,
    /// YYYY-MM-DD
    pub expiration: String,
    pub front_url: String,
    pub back_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    /// Acepta el alias legacy "stretcher" (se normaliza a stretcher_van)
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: Option<String>,
}

/// Respuesta de envío exitoso
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmitted {
    pub success: bool,
    pub driver_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_camel_case_payload() {
        let raw = r#"{
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "personalInfo": {
                "fullName": "Dana Fields",
                "phone": "6145550142",
                "dateOfBirth": "1992-04-20",
                "address": {
                    "line1": "44 Oak Ave",
                    "city": "Columbus",
                    "state": "OH",
                    "zip": "43004"
                }
            },
            "employmentType": "1099",
            "license": {
                "number": "DL445566",
                "state": "OH",
                "expiration": "2030-02-01",
                "frontUrl": "uploads/front.jpg",
                "backUrl": "uploads/back.jpg"
            },
            "vehicle": {
                "type": "stretcher",
                "make": "Ford",
                "model": "Transit",
                "year": 2021,
                "licensePlate": "HJK4821"
            },
            "eulaVersion": "2025-11"
        }"#;

        let payload: ApplicationSubmission = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.employment_type, Some(EmploymentType::C1099));
        assert_eq!(payload.personal_info.unwrap().address.state, "OH");
        assert_eq!(payload.vehicle.unwrap().vehicle_type, "stretcher");
        assert!(payload.experience_notes.is_none());
    }

    #[test]
    fn test_missing_sections_deserialize_as_none() {
        let payload: ApplicationSubmission = serde_json::from_str("{}").unwrap();
        assert!(payload.company_id.is_none());
        assert!(payload.personal_info.is_none());
        assert!(payload.license.is_none());
    }
}
