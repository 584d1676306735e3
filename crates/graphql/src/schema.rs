//! GraphQL schema definition.
//!
//! This module provides the patient schema: the paginated `patients`
//! connection, single record lookup, and the create/update/delete
//! mutations, all backed by a `PatientRepository`.

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, ID, Object, Result, Schema, SchemaBuilder,
};
use tracing::{debug, info};

use patientdesk_core::error::StorageError;
use patientdesk_core::metrics::record_mutation;
use patientdesk_core::models::{AgeRange, PatientFilter};
use patientdesk_core::ports::{
    Cursor, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination, PatientRepository,
};

use crate::types::{
    AgeRangeInput, CreatePatientInput, DeleteResponse, Gender, Patient, PatientConnection,
    PatientSchema, PatientStatus, UpdatePatientInput,
};

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Maximum length for string filter parameters.
const MAX_FILTER_STRING_LENGTH: usize = 128;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the patient schema over `repository`.
///
/// Includes query depth and complexity limits for DoS protection.
pub fn build_schema<R: PatientRepository + 'static>(repository: Arc<R>) -> PatientSchema {
    schema_builder(repository)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Create a schema builder with repository data.
///
/// Remember to call `.limit_depth()` and `.limit_complexity()` before `.finish()`.
pub fn schema_builder<R: PatientRepository + 'static>(
    repository: Arc<R>,
) -> SchemaBuilder<PatientQuery, PatientMutation, EmptySubscription> {
    let repo: Arc<dyn PatientRepository> = repository;
    Schema::build(PatientQuery, PatientMutation, EmptySubscription).data(repo)
}

// -----------------------------------------------------------------------------
// Query
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct PatientQuery;

#[Object]
impl PatientQuery {
    /// List patients matching the filters, newest first.
    #[allow(clippy::too_many_arguments)]
    async fn patients<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        #[graphql(default = 10)] first: Option<i32>,
        after: Option<String>,
        search: Option<String>,
        status: Option<PatientStatus>,
        gender: Option<Gender>,
        age_range: Option<AgeRangeInput>,
    ) -> Result<PatientConnection> {
        validate_filter_string(&search, "search")?;
        let repo = ctx.data::<Arc<dyn PatientRepository>>()?;

        let filter = PatientFilter {
            search,
            status: status.map(Into::into),
            gender: gender.map(Into::into),
            age_range: age_range.map(|r| AgeRange {
                min: r.min,
                max: r.max,
            }),
        }
        .normalized();

        let pagination = Pagination {
            first: Some(validate_pagination_first(first)),
            after: after.map(parse_cursor).transpose()?,
        };

        let connection = repo
            .list_patients(filter, pagination)
            .await
            .map_err(|e| match e {
                StorageError::InvalidCursor(_) => bad_user_input(e.to_string()),
                other => other.into(),
            })?;
        Ok(PatientConnection::from(connection))
    }

    /// Get a patient by ID.
    async fn patient<'ctx>(&self, ctx: &Context<'ctx>, id: ID) -> Result<Option<Patient>> {
        let repo = ctx.data::<Arc<dyn PatientRepository>>()?;

        let patient = repo.get_patient(&id).await?;
        Ok(patient.map(Patient::from))
    }
}

// -----------------------------------------------------------------------------
// Mutation
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct PatientMutation;

#[Object]
impl PatientMutation {
    /// Create a patient. New records are listed first and start `active`.
    async fn create_patient<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        input: CreatePatientInput,
    ) -> Result<Patient> {
        let repo = ctx.data::<Arc<dyn PatientRepository>>()?;

        let patient = repo.create_patient(input.into_domain()?).await?;
        record_mutation("create", "ok");
        info!(id = %patient.id, "👤 Patient created");
        Ok(Patient::from(patient))
    }

    /// Merge the provided fields into an existing patient.
    async fn update_patient<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: ID,
        input: UpdatePatientInput,
    ) -> Result<Patient> {
        let repo = ctx.data::<Arc<dyn PatientRepository>>()?;

        match repo.update_patient(&id, input.into_domain()?).await {
            Ok(patient) => {
                record_mutation("update", "ok");
                debug!(id = %patient.id, "Patient updated");
                Ok(Patient::from(patient))
            }
            Err(StorageError::NotFound(message)) => {
                record_mutation("update", "not_found");
                Err(not_found(message))
            }
            Err(e) => {
                record_mutation("update", "error");
                Err(e.into())
            }
        }
    }

    /// Delete a patient. Unknown ids answer `success: false`.
    async fn delete_patient<'ctx>(&self, ctx: &Context<'ctx>, id: ID) -> Result<DeleteResponse> {
        let repo = ctx.data::<Arc<dyn PatientRepository>>()?;

        if repo.delete_patient(&id).await? {
            record_mutation("delete", "ok");
            info!(id = %id.as_str(), "🗑️ Patient deleted");
            Ok(DeleteResponse {
                success: true,
                message: "Patient deleted successfully".to_string(),
            })
        } else {
            record_mutation("delete", "not_found");
            Ok(DeleteResponse {
                success: false,
                message: format!("Patient with id {} not found", id.as_str()),
            })
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

/// GraphQL error tagged with `extensions.code = "NOT_FOUND"`.
fn not_found(message: String) -> async_graphql::Error {
    async_graphql::Error::new(message).extend_with(|_, e| e.set("code", "NOT_FOUND"))
}

/// GraphQL error tagged with `extensions.code = "BAD_USER_INPUT"`.
fn bad_user_input(message: String) -> async_graphql::Error {
    async_graphql::Error::new(message).extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
}

/// Parse an `after` cursor, rejecting anything that is not an offset.
fn parse_cursor(value: String) -> Result<Cursor> {
    let cursor = Cursor::new(value);
    cursor.offset().map_err(|e| bad_user_input(e.to_string()))?;
    Ok(cursor)
}

/// Validate a filter string parameter.
///
/// Empty strings are allowed and mean "no constraint".
fn validate_filter_string(s: &Option<String>, field_name: &str) -> Result<()> {
    if let Some(value) = s
        && value.len() > MAX_FILTER_STRING_LENGTH
    {
        return Err(async_graphql::Error::new(format!(
            "{} too long: maximum {} characters allowed",
            field_name, MAX_FILTER_STRING_LENGTH
        )));
    }
    Ok(())
}

/// Validate and normalize pagination first parameter.
fn validate_pagination_first(first: Option<i32>) -> u32 {
    first
        .unwrap_or(DEFAULT_PAGE_SIZE as i32)
        .clamp(1, MAX_PAGE_SIZE as i32) as u32
}
