//! Patient form: field validation and create-or-update submission.

use std::sync::{Arc, LazyLock};

use chrono::{NaiveDate, Utc};
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::error::{ServiceResult, ValidationErrors};
use crate::metrics::record_mutation;
use crate::models::{
    Address, CreatePatientInput, EmergencyContact, Gender, Insurance, Patient, UpdatePatientInput,
};
use crate::ports::{Notification, Notifier, PatientGateway};

/// Country stored when the field is left blank.
pub const DEFAULT_COUNTRY: &str = "USA";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex: email"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-\(\)]+$").expect("static regex: phone"));
static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,5}(-\d{4})?$").expect("static regex: zip code"));

/// Raw values as typed into the patient form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientFormInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub medical_record_number: String,
    pub insurance_provider: String,
    pub policy_number: String,
    pub group_number: String,
    pub contact_name: String,
    pub contact_relationship: String,
    pub contact_phone: String,
    pub contact_email: String,
}

impl PatientFormInput {
    /// Prefill the form from an existing record.
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            date_of_birth: Some(patient.date_of_birth),
            gender: Some(patient.gender),
            street: patient.address.street.clone(),
            city: patient.address.city.clone(),
            state: patient.address.state.clone(),
            zip_code: patient.address.zip_code.clone(),
            country: patient.address.country.clone(),
            medical_record_number: patient.medical_record_number.clone(),
            insurance_provider: patient.insurance.provider.clone(),
            policy_number: patient.insurance.policy_number.clone(),
            group_number: patient.insurance.group_number.clone().unwrap_or_default(),
            contact_name: patient.emergency_contact.name.clone(),
            contact_relationship: patient.emergency_contact.relationship.clone(),
            contact_phone: patient.emergency_contact.phone.clone(),
            contact_email: patient.emergency_contact.email.clone(),
        }
    }

    /// Check every field and build the mutation input.
    ///
    /// All violations are collected; the first failing field does not hide
    /// the others.
    pub fn validate(&self, today: NaiveDate) -> Result<CreatePatientInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = self.first_name.trim();
        check_name(&mut errors, "firstName", "first name", "First name", first_name);
        let last_name = self.last_name.trim();
        check_name(&mut errors, "lastName", "last name", "Last name", last_name);

        let email = self.email.trim();
        if email.is_empty() {
            errors.push("email", "Please enter email address");
        } else if !EMAIL.is_match(email) {
            errors.push("email", "Please enter a valid email address");
        }

        let phone = self.phone.trim();
        check_phone(&mut errors, "phone", "Please enter phone number", phone);

        match self.date_of_birth {
            None => errors.push("dateOfBirth", "Please select date of birth"),
            Some(dob) if dob > today => {
                errors.push("dateOfBirth", "Date of birth cannot be in the future")
            }
            Some(_) => {}
        }
        if self.gender.is_none() {
            errors.push("gender", "Please select gender");
        }

        let street = required(
            &mut errors,
            "address.street",
            "Please enter street address",
            &self.street,
        );
        let city = required(&mut errors, "address.city", "Please enter city", &self.city);
        let state = required(&mut errors, "address.state", "Please enter state", &self.state);

        let zip_code = self.zip_code.trim();
        if zip_code.is_empty() {
            errors.push("address.zipCode", "Please enter ZIP code");
        } else if !ZIP_CODE.is_match(zip_code) {
            errors.push(
                "address.zipCode",
                "Please enter a valid ZIP code (1234, 12345 or 12345-6789)",
            );
        }

        let mrn = required(
            &mut errors,
            "medicalRecordNumber",
            "Please enter medical record number",
            &self.medical_record_number,
        );
        let provider = required(
            &mut errors,
            "insurance.provider",
            "Please enter insurance provider",
            &self.insurance_provider,
        );
        let policy_number = required(
            &mut errors,
            "insurance.policyNumber",
            "Please enter policy number",
            &self.policy_number,
        );

        let contact_name = required(
            &mut errors,
            "emergencyContact.name",
            "Please enter emergency contact name",
            &self.contact_name,
        );
        let relationship = required(
            &mut errors,
            "emergencyContact.relationship",
            "Please enter relationship",
            &self.contact_relationship,
        );
        let contact_phone = self.contact_phone.trim();
        check_phone(
            &mut errors,
            "emergencyContact.phone",
            "Please enter emergency contact phone",
            contact_phone,
        );
        // Optional, but must be well formed when given.
        let contact_email = self.contact_email.trim();
        if !contact_email.is_empty() && !EMAIL.is_match(contact_email) {
            errors.push("emergencyContact.email", "Please enter a valid email address");
        }

        let (Some(date_of_birth), Some(gender)) = (self.date_of_birth, self.gender) else {
            return Err(errors);
        };
        errors.into_result()?;

        let country = match self.country.trim() {
            "" => DEFAULT_COUNTRY.to_string(),
            c => c.to_string(),
        };
        let group_number = Some(self.group_number.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        Ok(CreatePatientInput {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            date_of_birth,
            gender,
            address: Address {
                street,
                city,
                state,
                zip_code: zip_code.to_string(),
                country,
            },
            medical_record_number: mrn,
            insurance: Insurance {
                provider,
                policy_number,
                group_number,
            },
            emergency_contact: EmergencyContact {
                name: contact_name,
                relationship,
                phone: contact_phone.to_string(),
                email: contact_email.to_string(),
            },
        })
    }
}

fn required(errors: &mut ValidationErrors, field: &str, message: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, message);
    }
    value.to_string()
}

fn check_name(errors: &mut ValidationErrors, field: &str, label: &str, title: &str, value: &str) {
    if value.is_empty() {
        errors.push(field, format!("Please enter {}", label));
    } else if value.chars().count() < 2 {
        errors.push(field, format!("{} must be at least 2 characters", title));
    }
}

fn check_phone(errors: &mut ValidationErrors, field: &str, missing: &str, value: &str) {
    if value.is_empty() {
        errors.push(field, missing);
    } else if !PHONE.is_match(value) {
        errors.push(field, "Please enter a valid phone number");
    }
}

// =============================================================================
// FormController
// =============================================================================

/// Submits the patient form through the gateway.
///
/// The presence of an id decides between create and update.
pub struct FormController<G: PatientGateway> {
    gateway: Arc<G>,
    notifier: Arc<dyn Notifier>,
}

impl<G: PatientGateway> FormController<G> {
    pub fn new(gateway: Arc<G>, notifier: Arc<dyn Notifier>) -> Self {
        Self { gateway, notifier }
    }

    /// Validate and save.
    ///
    /// Validation failures are returned for inline display and are not
    /// notified. Gateway failures are notified and returned.
    #[instrument(skip(self, form))]
    pub async fn submit(
        &self,
        editing_id: Option<&str>,
        form: &PatientFormInput,
    ) -> ServiceResult<Patient> {
        let kind = if editing_id.is_some() { "update" } else { "create" };

        let input = match form.validate(Utc::now().date_naive()) {
            Ok(input) => input,
            Err(errors) => {
                record_mutation(kind, "invalid");
                return Err(errors.into());
            }
        };

        let result = match editing_id {
            Some(id) => {
                self.gateway
                    .update_patient(id, &UpdatePatientInput::from(input))
                    .await
            }
            None => self.gateway.create_patient(&input).await,
        };

        match result {
            Ok(patient) => {
                record_mutation(kind, "ok");
                info!(id = %patient.id, kind, "Patient saved");
                let message = if editing_id.is_some() {
                    "Patient updated successfully"
                } else {
                    "Patient created successfully"
                };
                self.notifier.notify(Notification::success(message));
                Ok(patient)
            }
            Err(e) => {
                record_mutation(kind, "error");
                warn!(error = %e, kind, "Saving patient failed");
                self.notifier
                    .notify(Notification::error("Failed to save patient. Please try again."));
                Err(e.into())
            }
        }
    }
}
