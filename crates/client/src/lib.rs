//! GraphQL client for the patient API.
//!
//! Implements the `PatientGateway` port from `patientdesk-core` on top of a
//! pluggable [`GraphqlTransport`]. [`HttpTransport`] talks to a running
//! server; tests swap in a transport that executes a schema in-process.
//!
//! # Usage
//!
//! ```ignore
//! use patientdesk_client::{ClientConfig, GraphqlPatientGateway, HttpTransport};
//!
//! let transport = HttpTransport::new(&ClientConfig::default())?;
//! let gateway = Arc::new(GraphqlPatientGateway::new(transport));
//! let list = PatientListService::new(gateway, notifier);
//! ```

mod gateway;
pub mod queries;
mod transport;

pub use gateway::GraphqlPatientGateway;
pub use transport::{
    ClientConfig, GraphqlError, GraphqlRequest, GraphqlResponse, GraphqlTransport, HttpTransport,
};
