//! Error types for the patientdesk domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`DomainError`] - Business rule and input validation errors
//! - [`StorageError`] - Repository errors
//! - [`GatewayError`] - Errors talking to the remote patient API
//! - [`ServiceError`] - Top-level errors returned by the list and form services
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Validation Errors
// =============================================================================

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the field (e.g. `address.zipCode`).
    pub field: String,
    /// Human readable message shown next to the field.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors collected while validating one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for a field, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// =============================================================================
// Domain Errors
// =============================================================================

/// Business logic and domain rule violations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Patient was not found.
    #[error("Patient with id {0} not found")]
    PatientNotFound(String),

    /// Pagination cursor could not be interpreted.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Page size outside the supported range.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(u32),

    /// Page numbers are 1-based.
    #[error("Invalid page number: {0}")]
    InvalidPage(u32),

    /// One or more input fields were rejected.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Repository errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The `after` cursor does not point into the result set.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// A record with the same identifier already exists.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Seed data could not be read or decoded.
    #[error("Seed error: {0}")]
    SeedError(String),

    /// Data serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors raised while calling the patient API from the client side.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failed (connection refused, timeout, non-2xx status).
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with GraphQL errors.
    #[error("API error: {0}")]
    Api(String),

    /// Mutation target does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape.
    #[error("Decoding error: {0}")]
    Decode(String),
}

// =============================================================================
// Service Errors
// =============================================================================

/// Coarse classification used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, shown inline next to the offending input.
    Validation,
    /// Surfaced as a dismissible notification; retry is manual.
    Network,
    /// Mutation target missing; surfaced as a notification.
    NotFound,
}

/// Top-level errors returned by the list and form services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain logic error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Remote API error.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    /// Map onto the user-facing error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(DomainError::PatientNotFound(_))
            | ServiceError::Domain(DomainError::Storage(StorageError::NotFound(_)))
            | ServiceError::Gateway(GatewayError::NotFound(_)) => ErrorKind::NotFound,
            ServiceError::Domain(DomainError::Validation(_))
            | ServiceError::Domain(DomainError::InvalidCursor(_))
            | ServiceError::Domain(DomainError::Storage(StorageError::InvalidCursor(_)))
            | ServiceError::Domain(DomainError::InvalidPageSize(_))
            | ServiceError::Domain(DomainError::InvalidPage(_)) => ErrorKind::Validation,
            _ => ErrorKind::Network,
        }
    }

    /// Field errors, when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ServiceError::Domain(DomainError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Domain(DomainError::Validation(errors))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
