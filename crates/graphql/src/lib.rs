//! GraphQL API for patientdesk.
//!
//! Serves the patient records over GraphQL: a Relay-style `patients`
//! connection with search and enum filters, `patient(id)`, and the
//! create/update/delete mutations.
//!
//! # Usage
//!
//! ```ignore
//! use patientdesk_graphql::{build_schema, serve, ServerConfig};
//!
//! let schema = build_schema(Arc::new(repository));
//! serve(schema, ServerConfig::default()).await?;
//! ```

mod schema;
mod server;
mod types;

pub use schema::{
    MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH, PatientMutation, PatientQuery, build_schema,
    schema_builder,
};
pub use server::{ServerConfig, router, serve, serve_with_shutdown};
pub use types::{PageInfo, PatientConnection, PatientSchema};
