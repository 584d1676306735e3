//! Storage layer for patientdesk.
//!
//! This crate provides the in-memory implementation of the
//! `PatientRepository` trait defined in `patientdesk-core`, plus the seed
//! data it starts from.
//!
//! - [`memory::InMemoryPatientRepository`] - Newest-first patient store
//! - [`memory::SeedSource`] - Seed file or generated records
//!
//! # Usage
//!
//! ```ignore
//! use patientdesk_storage::{open, SeedSource};
//!
//! let repo = Arc::new(open(&SeedSource::Generated(50)).await?);
//! ```

pub mod memory;

pub use memory::{InMemoryPatientRepository, SeedSource, open};
