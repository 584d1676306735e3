//! Patient repository backed by a vector in memory.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use patientdesk_core::error::{StorageError, StorageResult};
use patientdesk_core::models::{CreatePatientInput, Patient, PatientFilter, UpdatePatientInput};
use patientdesk_core::ports::{Connection, Cursor, Edge, PageInfo, Pagination, PatientRepository};

/// In-memory implementation of `PatientRepository`.
///
/// Records are kept newest first: creates are prepended. List cursors are
/// zero-based offsets into the filtered sequence, and `after` is exclusive.
pub struct InMemoryPatientRepository {
    patients: RwLock<Vec<Patient>>,
    /// Pinned "today" for age filters; the current UTC date when unset.
    today: Option<NaiveDate>,
}

impl Default for InMemoryPatientRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self {
            patients: RwLock::new(Vec::new()),
            today: None,
        }
    }

    /// Build a repository holding `patients` in the given order.
    ///
    /// Fails when two records share an id.
    pub fn with_patients(patients: Vec<Patient>) -> StorageResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for p in &patients {
            if !seen.insert(p.id.as_str()) {
                return Err(StorageError::ConstraintViolation(format!(
                    "duplicate patient id {}",
                    p.id
                )));
            }
        }
        Ok(Self {
            patients: RwLock::new(patients),
            today: None,
        })
    }

    /// Evaluate age filters against a fixed date.
    pub fn pinned_to(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Decode the exclusive `after` cursor into the index of the first record.
fn start_index(after: Option<&Cursor>) -> StorageResult<usize> {
    match after {
        None => Ok(0),
        Some(cursor) => cursor
            .offset()
            .ok()
            .and_then(|offset| offset.checked_add(1))
            .ok_or_else(|| StorageError::InvalidCursor(cursor.value.clone())),
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn get_patient(&self, id: &str) -> StorageResult<Option<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients.iter().find(|p| p.id == id).cloned())
    }

    #[instrument(skip(self, filter, pagination))]
    async fn list_patients(
        &self,
        filter: PatientFilter,
        pagination: Pagination,
    ) -> StorageResult<Connection<Patient>> {
        let limit = pagination.limit();
        let start = start_index(pagination.after.as_ref())?;
        let today = self.today();

        let patients = self.patients.read().await;
        let matching: Vec<&Patient> = patients
            .iter()
            .filter(|p| filter.matches(p, today))
            .collect();
        let total = matching.len();

        let edges: Vec<Edge<Patient>> = matching
            .into_iter()
            .enumerate()
            .skip(start)
            .take(limit)
            .map(|(offset, patient)| Edge {
                node: patient.clone(),
                cursor: Cursor::from_offset(offset),
            })
            .collect();

        let end = start.saturating_add(limit);
        let page_info = PageInfo {
            has_next_page: end < total,
            has_previous_page: start > 0,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };

        debug!(start, returned = edges.len(), total, "Listed patients");

        Ok(Connection {
            edges,
            page_info,
            total_count: total as i64,
        })
    }

    #[instrument(skip(self, input))]
    async fn create_patient(&self, input: CreatePatientInput) -> StorageResult<Patient> {
        let patient = Patient::from_input(format!("patient-{}", Uuid::new_v4()), input, Utc::now());
        self.patients.write().await.insert(0, patient.clone());
        debug!(id = %patient.id, "Patient created");
        Ok(patient)
    }

    #[instrument(skip(self, input))]
    async fn update_patient(&self, id: &str, input: UpdatePatientInput) -> StorageResult<Patient> {
        let mut patients = self.patients.write().await;
        let patient = patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("Patient with id {} not found", id)))?;
        patient.apply_update(input, Utc::now());
        Ok(patient.clone())
    }

    #[instrument(skip(self))]
    async fn delete_patient(&self, id: &str) -> StorageResult<bool> {
        let mut patients = self.patients.write().await;
        match patients.iter().position(|p| p.id == id) {
            Some(index) => {
                patients.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.patients.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::seed::generate;
    use patientdesk_core::models::{AgeRange, PatientStatus};

    fn repo(count: usize) -> InMemoryPatientRepository {
        InMemoryPatientRepository::with_patients(generate(count))
            .unwrap()
            .pinned_to(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn page(first: u32, after: Option<usize>) -> Pagination {
        Pagination {
            first: Some(first),
            after: after.map(Cursor::from_offset),
        }
    }

    // Test critique: les pages consécutives ne se chevauchent pas
    #[tokio::test]
    async fn test_consecutive_pages_do_not_overlap() {
        let repo = repo(25);
        let filter = PatientFilter::default();

        let p1 = repo.list_patients(filter.clone(), page(10, None)).await.unwrap();
        assert_eq!(p1.edges.len(), 10);
        assert!(p1.page_info.has_next_page);
        assert!(!p1.page_info.has_previous_page);
        assert_eq!(p1.page_info.end_cursor, Some(Cursor::from_offset(9)));

        let p2 = repo
            .list_patients(filter.clone(), Pagination { first: Some(10), after: p1.next_cursor() })
            .await
            .unwrap();
        assert_eq!(p2.page_info.start_cursor, Some(Cursor::from_offset(10)));
        assert_ne!(p1.edges[9].node.id, p2.edges[0].node.id);

        let p3 = repo.list_patients(filter, page(10, Some(19))).await.unwrap();
        assert_eq!(p3.edges.len(), 5);
        assert!(!p3.page_info.has_next_page);
        assert_eq!(p3.next_cursor(), None);
        assert_eq!(p3.total_count, 25);
    }

    #[tokio::test]
    async fn test_cursor_past_the_end_returns_empty_page() {
        let repo = repo(5);
        let conn = repo
            .list_patients(PatientFilter::default(), page(10, Some(40)))
            .await
            .unwrap();
        assert!(conn.edges.is_empty());
        assert_eq!(conn.page_info.start_cursor, None);
        assert_eq!(conn.total_count, 5);
    }

    #[tokio::test]
    async fn test_garbage_cursor_is_rejected() {
        let repo = repo(5);
        let err = repo
            .list_patients(
                PatientFilter::default(),
                Pagination {
                    first: Some(10),
                    after: Some(Cursor::new("abc")),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidCursor(_)));
    }

    // Test critique: le curseur maximal ne doit pas déborder
    #[tokio::test]
    async fn test_max_offset_cursor_is_rejected() {
        let repo = repo(5);
        let err = repo
            .list_patients(
                PatientFilter::default(),
                Pagination {
                    first: Some(10),
                    after: Some(Cursor::from_offset(usize::MAX)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidCursor(v) if v == usize::MAX.to_string()));
    }

    #[tokio::test]
    async fn test_filters_apply_before_pagination() {
        let repo = repo(50);
        let filter = PatientFilter {
            status: Some(PatientStatus::Inactive),
            age_range: Some(AgeRange {
                min: Some(30),
                max: None,
            }),
            ..Default::default()
        };
        let conn = repo.list_patients(filter, page(100, None)).await.unwrap();
        assert_eq!(conn.total_count as usize, conn.edges.len());
        assert!(
            conn.edges
                .iter()
                .all(|e| e.node.status == PatientStatus::Inactive)
        );
    }

    // Création: le nouvel enregistrement apparaît en tête de liste
    #[tokio::test]
    async fn test_create_prepends_with_active_status() {
        let repo = repo(3);
        let mut input_src = generate(1).remove(0);
        input_src.status = PatientStatus::Pending;
        let input = CreatePatientInput {
            first_name: "Nora".into(),
            last_name: "Quinn".into(),
            email: input_src.email,
            phone: input_src.phone,
            date_of_birth: input_src.date_of_birth,
            gender: input_src.gender,
            address: input_src.address,
            medical_record_number: "MRN-NEW".into(),
            insurance: input_src.insurance,
            emergency_contact: input_src.emergency_contact,
        };

        let created = repo.create_patient(input).await.unwrap();
        assert!(created.id.starts_with("patient-"));
        assert_eq!(created.status, PatientStatus::Active);
        assert_eq!(created.created_at, created.updated_at);

        let first = repo
            .list_patients(PatientFilter::default(), page(1, None))
            .await
            .unwrap();
        assert_eq!(first.edges[0].node.id, created.id);
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_ids() {
        let repo = repo(2);
        let err = repo
            .update_patient("missing", UpdatePatientInput::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Patient with id missing not found"));
        assert!(!repo.delete_patient("missing").await.unwrap());

        let id = generate(2)[1].id.clone();
        let updated = repo
            .update_patient(
                &id,
                UpdatePatientInput {
                    status: Some(PatientStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, PatientStatus::Inactive);
        assert!(updated.updated_at >= updated.created_at);

        assert!(repo.delete_patient(&id).await.unwrap());
        assert!(repo.get_patient(&id).await.unwrap().is_none());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut patients = generate(2);
        patients[1].id = patients[0].id.clone();
        assert!(matches!(
            InMemoryPatientRepository::with_patients(patients),
            Err(StorageError::ConstraintViolation(_))
        ));
    }
}
