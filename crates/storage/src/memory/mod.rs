//! In-memory storage adapter.
//!
//! This module implements the `PatientRepository` port from
//! `patientdesk-core` over a process-local vector. Nothing is persisted;
//! the store is rebuilt from seed data on every start.
//!
//! # Usage
//!
//! ```ignore
//! let repo = open(&SeedSource::Generated(50)).await?;
//! let repo: Arc<dyn PatientRepository> = Arc::new(repo);
//! ```

mod repository;
pub mod seed;

use std::path::PathBuf;

use tracing::{info, instrument};

use patientdesk_core::error::StorageResult;

pub use repository::InMemoryPatientRepository;

/// Where the initial records come from.
#[derive(Debug, Clone)]
pub enum SeedSource {
    /// A JSON file shaped like `{"patients": [...]}`.
    File(PathBuf),
    /// `n` generated records.
    Generated(usize),
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::Generated(50)
    }
}

/// Build a repository loaded with seed data.
#[instrument]
pub async fn open(source: &SeedSource) -> StorageResult<InMemoryPatientRepository> {
    let patients = match source {
        SeedSource::File(path) => seed::load_file(path).await?,
        SeedSource::Generated(count) => seed::generate(*count),
    };
    info!(count = patients.len(), "Patient store seeded");
    InMemoryPatientRepository::with_patients(patients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patientdesk_core::ports::PatientRepository;

    #[tokio::test]
    async fn test_open_generated() {
        let repo = open(&SeedSource::default()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 50);
    }
}
