//! Core domain layer for patientdesk.
//!
//! This crate contains the domain models, port traits (interfaces), and
//! the list and form services that drive the patient desk. It follows
//! hexagonal architecture principles - this is the innermost layer with
//! no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   patientdesk (binary)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  patientdesk-graphql          │  patientdesk-client         │
//! │  (API server)                 │  (GraphQL gateway)          │
//! ├───────────────────────────────┴─────────────────────────────┤
//! │                  patientdesk-storage                        │
//! │                   (in-memory store)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  patientdesk-core  ← YOU ARE HERE           │
//! │               (models, ports, services)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models (Patient, PatientFilter, inputs)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - List orchestrator and form controller
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Ports
//!
//! - [`ports::PatientRepository`] - Server-side patient store
//! - [`ports::PatientGateway`] - Client-side access to the patient API
//! - [`ports::Notifier`] - User-visible success and error messages
//!
//! ## Cursor Pagination
//!
//! The API only supports forward cursors, so the cursor of page `N + 1` is
//! learned by fetching page `N`. [`services::PatientListService`] keeps a
//! [`services::CursorMap`] of the pages it has seen and, when asked to jump
//! ahead, fetches the skipped pages one after the other.
//!
//! ## List Lifecycle
//!
//! 1. Load page 1 under the current filter and page size
//! 2. Record the cursor of the next page after every fetch
//! 3. Reset to page 1 whenever the filter or page size changes
//! 4. Refresh the current page after a mutation, clamping to page 1

pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
