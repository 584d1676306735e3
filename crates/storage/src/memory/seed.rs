//! Seed data for the in-memory store.
//!
//! Records come either from a JSON file shaped like `{"patients": [...]}`
//! or from a deterministic generator.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use patientdesk_core::error::{StorageError, StorageResult};
use patientdesk_core::models::{
    Address, EmergencyContact, Gender, Insurance, Patient, PatientStatus,
};

const FIRST_NAMES: &[&str] = &[
    "Olivia", "Liam", "Emma", "Noah", "Ava", "Elijah", "Sophia", "James", "Mia", "Lucas",
    "Amelia", "Mateo", "Harper", "Ethan", "Evelyn", "Aiden",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas", "Moore",
];
const CITIES: &[(&str, &str, &str)] = &[
    ("Springfield", "IL", "62701"),
    ("Austin", "TX", "73301"),
    ("Portland", "OR", "97201"),
    ("Madison", "WI", "53703"),
    ("Boulder", "CO", "80302"),
    ("Raleigh", "NC", "27601"),
];
const PROVIDERS: &[&str] = &["Blue Cross", "Aetna", "Cigna", "UnitedHealthcare", "Kaiser"];
const RELATIONSHIPS: &[&str] = &["Spouse", "Parent", "Child", "Sibling", "Friend", "Guardian"];
const STREETS: &[&str] = &["Main St", "Oak Ave", "Maple Dr", "Cedar Ln", "Elm St", "Pine Rd"];

#[derive(Deserialize)]
struct SeedFile {
    patients: Vec<Patient>,
}

/// Read patients from a JSON seed file.
#[instrument]
pub async fn load_file(path: &Path) -> StorageResult<Vec<Patient>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::SeedError(format!("{}: {}", path.display(), e)))?;
    let patients = parse(&raw)?;
    debug!(count = patients.len(), "Seed file loaded");
    Ok(patients)
}

/// Decode the content of a seed file.
pub fn parse(raw: &str) -> StorageResult<Vec<Patient>> {
    serde_json::from_str::<SeedFile>(raw)
        .map(|file| file.patients)
        .map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// `count` deterministic patients, newest first.
///
/// Ids are `patient-1` .. `patient-{count}`; the same count always yields the
/// same records.
pub fn generate(count: usize) -> Vec<Patient> {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    (1..=count).rev().map(|n| generated(n, base)).collect()
}

fn generated(n: usize, base: DateTime<Utc>) -> Patient {
    let pick = |pool: &[&'static str], salt: usize| pool[(n * 7 + salt) % pool.len()];
    let first = FIRST_NAMES[n % FIRST_NAMES.len()];
    let last = LAST_NAMES[(n * 3) % LAST_NAMES.len()];
    let (city, state, zip) = CITIES[n % CITIES.len()];

    let gender = match n % 3 {
        0 => Gender::Male,
        1 => Gender::Female,
        _ => Gender::Other,
    };
    // Mostly active, with a sprinkling of the other states.
    let status = match n % 7 {
        0 => PatientStatus::Inactive,
        3 => PatientStatus::Pending,
        _ => PatientStatus::Active,
    };

    let year = 1940 + (n * 13 % 70) as i32;
    let month = (n % 12) as u32 + 1;
    let day = (n % 28) as u32 + 1;
    let date_of_birth = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN);
    let created_at = base + Duration::days(n as i64);

    Patient {
        id: format!("patient-{}", n),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), n),
        phone: format!("+1 (555) {:03}-{:04}", n % 1000, (n * 37) % 10_000),
        date_of_birth,
        gender,
        address: Address {
            street: format!("{} {}", 100 + n, pick(STREETS, 1)),
            city: city.to_string(),
            state: state.to_string(),
            zip_code: zip.to_string(),
            country: "USA".to_string(),
        },
        medical_record_number: format!("MRN-{:06}", n),
        insurance: Insurance {
            provider: pick(PROVIDERS, 2).to_string(),
            policy_number: format!("POL-{:08}", n * 7919),
            group_number: (n % 2 == 0).then(|| format!("GRP-{:04}", n % 97)),
        },
        emergency_contact: EmergencyContact {
            name: format!("{} {}", pick(FIRST_NAMES, 5), last),
            relationship: pick(RELATIONSHIPS, 3).to_string(),
            phone: format!("+1 (555) {:03}-{:04}", (n + 500) % 1000, (n * 53) % 10_000),
            email: format!("contact{}@example.com", n),
        },
        status,
        created_at,
        updated_at: created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic_and_newest_first() {
        let a = generate(30);
        let b = generate(30);
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert_eq!(a[0].id, "patient-30");
        assert_eq!(a[29].id, "patient-1");
        assert!(a[0].created_at > a[29].created_at);
    }

    // Les statuts et genres générés couvrent toutes les valeurs pour les filtres
    #[test]
    fn test_generate_covers_every_status_and_gender() {
        let patients = generate(21);
        for status in [
            PatientStatus::Active,
            PatientStatus::Inactive,
            PatientStatus::Pending,
        ] {
            assert!(patients.iter().any(|p| p.status == status));
        }
        for gender in [Gender::Male, Gender::Female, Gender::Other] {
            assert!(patients.iter().any(|p| p.gender == gender));
        }
    }

    #[test]
    fn test_parse_seed_file() {
        let json = serde_json::json!({ "patients": generate(2) }).to_string();
        let patients = parse(&json).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].id, "patient-2");

        let err = parse("{\"patients\": [{\"id\": 1}]}").unwrap_err();
        assert!(matches!(err, StorageError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_a_seed_error() {
        let err = load_file(Path::new("/nonexistent/patients.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::SeedError(_)));
    }
}
