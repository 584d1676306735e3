//! Port trait for the remote patient API.
//!
//! The list and form services only talk to patient data through this
//! trait. Implementations live in the infrastructure layer
//! (e.g., `patientdesk-client` over GraphQL).

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::models::{CreatePatientInput, DeleteOutcome, Patient, PatientFilter, UpdatePatientInput};

use super::pagination::Cursor;

/// One materialized page of the patient list.
#[derive(Debug, Clone, Default)]
pub struct PatientPage {
    /// Records in display order.
    pub records: Vec<Patient>,
    /// Cursor for the following page; `None` once the result set ends.
    pub next_cursor: Option<Cursor>,
    /// Number of records matching the filter across all pages.
    pub total_count: u64,
}

/// Client-side access to the patient API.
#[async_trait]
pub trait PatientGateway: Send + Sync {
    /// Fetch the page that starts after `after` (or at the beginning).
    async fn fetch_page(
        &self,
        filter: &PatientFilter,
        page_size: u32,
        after: Option<&Cursor>,
    ) -> GatewayResult<PatientPage>;

    /// Create a patient.
    async fn create_patient(&self, input: &CreatePatientInput) -> GatewayResult<Patient>;

    /// Update a patient.
    async fn update_patient(&self, id: &str, input: &UpdatePatientInput) -> GatewayResult<Patient>;

    /// Delete a patient.
    async fn delete_patient(&self, id: &str) -> GatewayResult<DeleteOutcome>;
}
