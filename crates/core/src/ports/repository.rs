//! Port trait for the patient repository.
//!
//! This trait defines the storage interface used by the API layer.
//! Implementations live in the infrastructure layer (e.g., `patientdesk-storage`).

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{CreatePatientInput, Patient, PatientFilter, UpdatePatientInput};

use super::pagination::{Connection, Pagination};

/// Repository owning the lifetime of patient records.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Get patient by ID.
    async fn get_patient(&self, id: &str) -> StorageResult<Option<Patient>>;

    /// List patients matching `filter`, one page at a time.
    async fn list_patients(
        &self,
        filter: PatientFilter,
        pagination: Pagination,
    ) -> StorageResult<Connection<Patient>>;

    /// Insert a new patient and return the stored record.
    async fn create_patient(&self, input: CreatePatientInput) -> StorageResult<Patient>;

    /// Merge `input` into an existing patient.
    ///
    /// Returns `StorageError::NotFound` when the id is unknown.
    async fn update_patient(&self, id: &str, input: UpdatePatientInput) -> StorageResult<Patient>;

    /// Remove a patient. Returns `false` when the id is unknown.
    async fn delete_patient(&self, id: &str) -> StorageResult<bool>;

    /// Number of stored patients.
    async fn count(&self) -> StorageResult<usize>;
}
