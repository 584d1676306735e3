//! Domain models representing patient records.
//!
//! These models are storage-agnostic and represent the canonical
//! form of patient data within the domain layer. Field names serialize
//! in camelCase, matching the GraphQL wire format.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enumerations
// =============================================================================

/// Administrative gender recorded on the patient chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Lifecycle status of a patient record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Inactive => "inactive",
            PatientStatus::Pending => "pending",
        }
    }
}

// =============================================================================
// Patient Record
// =============================================================================

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Insurance coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    pub provider: String,
    pub policy_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
}

/// Person to call in an emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: String,
}

/// A patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Stable unique identifier.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Address,
    pub medical_record_number: String,
    pub insurance: Insurance,
    pub emergency_contact: EmergencyContact,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.date_of_birth, today)
    }

    /// Build a record from validated input.
    pub fn from_input(id: String, input: CreatePatientInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            address: input.address,
            medical_record_number: input.medical_record_number,
            insurance: input.insurance,
            emergency_contact: input.emergency_contact,
            status: PatientStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the provided fields of `input` into this record.
    pub fn apply_update(&mut self, input: UpdatePatientInput, now: DateTime<Utc>) {
        if let Some(v) = input.first_name {
            self.first_name = v;
        }
        if let Some(v) = input.last_name {
            self.last_name = v;
        }
        if let Some(v) = input.email {
            self.email = v;
        }
        if let Some(v) = input.phone {
            self.phone = v;
        }
        if let Some(v) = input.date_of_birth {
            self.date_of_birth = v;
        }
        if let Some(v) = input.gender {
            self.gender = v;
        }
        if let Some(v) = input.address {
            self.address = v;
        }
        if let Some(v) = input.medical_record_number {
            self.medical_record_number = v;
        }
        if let Some(v) = input.insurance {
            self.insurance = v;
        }
        if let Some(v) = input.emergency_contact {
            self.emergency_contact = v;
        }
        if let Some(v) = input.status {
            self.status = v;
        }
        self.updated_at = now;
    }
}

/// Whole years between `birth` and `today`.
///
/// One year is subtracted when this year's birthday has not been reached yet.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

// =============================================================================
// Mutation Inputs
// =============================================================================

/// Fields required to create a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Address,
    pub medical_record_number: String,
    pub insurance: Insurance,
    pub emergency_contact: EmergencyContact,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_record_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Insurance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
}

impl From<CreatePatientInput> for UpdatePatientInput {
    fn from(input: CreatePatientInput) -> Self {
        Self {
            first_name: Some(input.first_name),
            last_name: Some(input.last_name),
            email: Some(input.email),
            phone: Some(input.phone),
            date_of_birth: Some(input.date_of_birth),
            gender: Some(input.gender),
            address: Some(input.address),
            medical_record_number: Some(input.medical_record_number),
            insurance: Some(input.insurance),
            emergency_contact: Some(input.emergency_contact),
            status: None,
        }
    }
}

/// Result of a delete mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// Inclusive age bounds in whole years. A missing bound is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

impl AgeRange {
    pub fn contains(&self, age: i32) -> bool {
        self.min.is_none_or(|min| age >= min) && self.max.is_none_or(|max| age <= max)
    }
}

/// Active list filter. Absent fields mean "no constraint".
///
/// The value is replaced wholesale on every change, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,
}

impl PatientFilter {
    /// Drop blank search terms so they do not count as a constraint.
    pub fn normalized(mut self) -> Self {
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// Whether any constraint is set.
    pub fn is_active(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.status.is_some()
            || self.gender.is_some()
            || self.age_range.is_some()
    }

    /// Evaluate the filter against one record.
    pub fn matches(&self, patient: &Patient, today: NaiveDate) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim)
            && !term.is_empty()
        {
            let term = term.to_lowercase();
            let searchable = [
                &patient.first_name,
                &patient.last_name,
                &patient.email,
                &patient.medical_record_number,
            ];
            if !searchable
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            {
                return false;
            }
        }

        if let Some(status) = self.status
            && patient.status != status
        {
            return false;
        }

        if let Some(gender) = self.gender
            && patient.gender != gender
        {
            return false;
        }

        if let Some(range) = self.age_range
            && !range.contains(patient.age_on(today))
        {
            return false;
        }

        true
    }
}
