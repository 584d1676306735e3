//! GraphQL type definitions.

use async_graphql::{EmptySubscription, Enum, InputObject, Result, Schema, SimpleObject};
use chrono::{NaiveDate, SecondsFormat};

use patientdesk_core::models as domain;
use patientdesk_core::ports::Connection;

use crate::schema::{PatientMutation, PatientQuery};

/// The patient GraphQL schema type.
pub type PatientSchema = Schema<PatientQuery, PatientMutation, EmptySubscription>;

// -----------------------------------------------------------------------------
// Enums
// -----------------------------------------------------------------------------

#[derive(Enum, Clone, Copy, Debug, PartialEq, Eq)]
#[graphql(rename_items = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl From<domain::Gender> for Gender {
    fn from(g: domain::Gender) -> Self {
        match g {
            domain::Gender::Male => Gender::Male,
            domain::Gender::Female => Gender::Female,
            domain::Gender::Other => Gender::Other,
        }
    }
}

impl From<Gender> for domain::Gender {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Male => domain::Gender::Male,
            Gender::Female => domain::Gender::Female,
            Gender::Other => domain::Gender::Other,
        }
    }
}

#[derive(Enum, Clone, Copy, Debug, PartialEq, Eq)]
#[graphql(rename_items = "lowercase")]
pub enum PatientStatus {
    Active,
    Inactive,
    Pending,
}

impl From<domain::PatientStatus> for PatientStatus {
    fn from(s: domain::PatientStatus) -> Self {
        match s {
            domain::PatientStatus::Active => PatientStatus::Active,
            domain::PatientStatus::Inactive => PatientStatus::Inactive,
            domain::PatientStatus::Pending => PatientStatus::Pending,
        }
    }
}

impl From<PatientStatus> for domain::PatientStatus {
    fn from(s: PatientStatus) -> Self {
        match s {
            PatientStatus::Active => domain::PatientStatus::Active,
            PatientStatus::Inactive => domain::PatientStatus::Inactive,
            PatientStatus::Pending => domain::PatientStatus::Pending,
        }
    }
}

// -----------------------------------------------------------------------------
// Output Types
// -----------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<domain::Address> for Address {
    fn from(a: domain::Address) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            country: a.country,
        }
    }
}

#[derive(SimpleObject)]
pub struct Insurance {
    pub provider: String,
    pub policy_number: String,
    pub group_number: Option<String>,
}

impl From<domain::Insurance> for Insurance {
    fn from(i: domain::Insurance) -> Self {
        Self {
            provider: i.provider,
            policy_number: i.policy_number,
            group_number: i.group_number,
        }
    }
}

#[derive(SimpleObject)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: String,
}

impl From<domain::EmergencyContact> for EmergencyContact {
    fn from(c: domain::EmergencyContact) -> Self {
        Self {
            name: c.name,
            relationship: c.relationship,
            phone: c.phone,
            email: c.email,
        }
    }
}

/// Patient type.
///
/// Dates are plain strings: `dateOfBirth` is `YYYY-MM-DD`, timestamps are
/// RFC 3339.
#[derive(SimpleObject)]
pub struct Patient {
    pub id: async_graphql::ID,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: Address,
    pub medical_record_number: String,
    pub insurance: Insurance,
    pub emergency_contact: EmergencyContact,
    pub status: PatientStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<domain::Patient> for Patient {
    fn from(p: domain::Patient) -> Self {
        Self {
            id: p.id.into(),
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone: p.phone,
            date_of_birth: p.date_of_birth.format("%Y-%m-%d").to_string(),
            gender: p.gender.into(),
            address: p.address.into(),
            medical_record_number: p.medical_record_number,
            insurance: p.insurance.into(),
            emergency_contact: p.emergency_contact.into(),
            status: p.status.into(),
            created_at: p.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: p.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Result of `deletePatient`.
#[derive(SimpleObject)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(SimpleObject)]
pub struct PatientEdge {
    pub node: Patient,
    pub cursor: String,
}

#[derive(SimpleObject)]
pub struct PatientConnection {
    pub edges: Vec<PatientEdge>,
    pub page_info: PageInfo,
    pub total_count: i64,
}

impl From<Connection<domain::Patient>> for PatientConnection {
    fn from(conn: Connection<domain::Patient>) -> Self {
        Self {
            edges: conn
                .edges
                .into_iter()
                .map(|e| PatientEdge {
                    node: Patient::from(e.node),
                    cursor: e.cursor.value,
                })
                .collect(),
            page_info: PageInfo {
                has_next_page: conn.page_info.has_next_page,
                has_previous_page: conn.page_info.has_previous_page,
                start_cursor: conn.page_info.start_cursor.map(|c| c.value),
                end_cursor: conn.page_info.end_cursor.map(|c| c.value),
            },
            total_count: conn.total_count,
        }
    }
}

// -----------------------------------------------------------------------------
// Input Types
// -----------------------------------------------------------------------------

#[derive(InputObject)]
pub struct AgeRangeInput {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

#[derive(InputObject)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<AddressInput> for domain::Address {
    fn from(a: AddressInput) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            country: a.country,
        }
    }
}

#[derive(InputObject)]
pub struct InsuranceInput {
    pub provider: String,
    pub policy_number: String,
    pub group_number: Option<String>,
}

impl From<InsuranceInput> for domain::Insurance {
    fn from(i: InsuranceInput) -> Self {
        Self {
            provider: i.provider,
            policy_number: i.policy_number,
            group_number: i.group_number,
        }
    }
}

#[derive(InputObject)]
pub struct EmergencyContactInput {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: String,
}

impl From<EmergencyContactInput> for domain::EmergencyContact {
    fn from(c: EmergencyContactInput) -> Self {
        Self {
            name: c.name,
            relationship: c.relationship,
            phone: c.phone,
            email: c.email,
        }
    }
}

#[derive(InputObject)]
pub struct CreatePatientInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: AddressInput,
    pub medical_record_number: String,
    pub insurance: InsuranceInput,
    pub emergency_contact: EmergencyContactInput,
}

impl CreatePatientInput {
    pub fn into_domain(self) -> Result<domain::CreatePatientInput> {
        Ok(domain::CreatePatientInput {
            date_of_birth: parse_date(&self.date_of_birth)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            gender: self.gender.into(),
            address: self.address.into(),
            medical_record_number: self.medical_record_number,
            insurance: self.insurance.into(),
            emergency_contact: self.emergency_contact.into(),
        })
    }
}

#[derive(InputObject, Default)]
pub struct UpdatePatientInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub address: Option<AddressInput>,
    pub medical_record_number: Option<String>,
    pub insurance: Option<InsuranceInput>,
    pub emergency_contact: Option<EmergencyContactInput>,
    pub status: Option<PatientStatus>,
}

impl UpdatePatientInput {
    pub fn into_domain(self) -> Result<domain::UpdatePatientInput> {
        Ok(domain::UpdatePatientInput {
            date_of_birth: self.date_of_birth.as_deref().map(parse_date).transpose()?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            gender: self.gender.map(Into::into),
            address: self.address.map(Into::into),
            medical_record_number: self.medical_record_number,
            insurance: self.insurance.map(Into::into),
            emergency_contact: self.emergency_contact.map(Into::into),
            status: self.status.map(Into::into),
        })
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// A full timestamp is accepted too; only its date part is kept.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| {
        async_graphql::Error::new(format!(
            "Invalid dateOfBirth '{}': expected YYYY-MM-DD",
            s
        ))
    })
}
