//! In-memory gateway for service tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::{GatewayError, GatewayResult};
use crate::models::fixtures::patient;
use crate::models::{
    CreatePatientInput, DeleteOutcome, Patient, PatientFilter, UpdatePatientInput,
};
use crate::ports::{Cursor, PatientGateway, PatientPage};

/// One recorded `fetch_page` call.
#[derive(Debug, Clone)]
pub struct FetchCall {
    pub page_size: u32,
    pub after: Option<usize>,
}

/// Offset-cursor gateway over a vector, with call log and failure injection.
#[derive(Default)]
pub struct MemoryGateway {
    records: Mutex<Vec<Patient>>,
    calls: Mutex<Vec<FetchCall>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// Fail the next fetch only.
    pub fail_next: AtomicBool,
    /// Fail the Nth fetch counted since the last `clear_calls` (0 = never).
    pub fail_on_call: AtomicUsize,
    /// Fail every create/update/delete.
    pub fail_mutations: AtomicBool,
    pub delay_ms: AtomicU64,
    pub created: Mutex<Vec<CreatePatientInput>>,
    pub updated: Mutex<Vec<(String, UpdatePatientInput)>>,
}

impl MemoryGateway {
    /// `count` records with ids `patient-0` .. `patient-{count - 1}`.
    pub fn with_records(count: usize) -> Self {
        let records = (0..count)
            .map(|i| patient(&format!("patient-{i}"), "Patient", &format!("Number{i}")))
            .collect();
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn push_front(&self, record: Patient) {
        self.records.lock().unwrap().insert(0, record);
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn calls_after(&self) -> Vec<Option<usize>> {
        self.calls.lock().unwrap().iter().map(|c| c.after).collect()
    }

    pub fn calls_size(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|c| c.page_size).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }
}

#[async_trait]
impl PatientGateway for MemoryGateway {
    async fn fetch_page(
        &self,
        filter: &PatientFilter,
        page_size: u32,
        after: Option<&Cursor>,
    ) -> GatewayResult<PatientPage> {
        let after = after.map(|c| c.offset().unwrap());
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(FetchCall { page_size, after });
            calls.len()
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst)
            || self.fail_on_call.load(Ordering::SeqCst) == call_no
        {
            return Err(GatewayError::Network("connection refused".into()));
        }

        let matching: Vec<Patient> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.matches(p, Self::today()))
            .cloned()
            .collect();
        let start = after.map_or(0, |a| a + 1).min(matching.len());
        let end = (start + page_size as usize).min(matching.len());
        let next_cursor = (end < matching.len()).then(|| Cursor::from_offset(end - 1));

        Ok(PatientPage {
            records: matching[start..end].to_vec(),
            next_cursor,
            total_count: matching.len() as u64,
        })
    }

    async fn create_patient(&self, input: &CreatePatientInput) -> GatewayResult<Patient> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("timeout".into()));
        }
        self.created.lock().unwrap().push(input.clone());
        let id = format!("patient-new-{}", self.len());
        let record = Patient::from_input(id, input.clone(), Utc::now());
        self.push_front(record.clone());
        Ok(record)
    }

    async fn update_patient(&self, id: &str, input: &UpdatePatientInput) -> GatewayResult<Patient> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("timeout".into()));
        }
        self.updated
            .lock()
            .unwrap()
            .push((id.to_string(), input.clone()));
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("Patient with id {id} not found")))?;
        record.apply_update(input.clone(), Utc::now());
        Ok(record.clone())
    }

    async fn delete_patient(&self, id: &str) -> GatewayResult<DeleteOutcome> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("timeout".into()));
        }
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|p| p.id != id);
        Ok(if records.len() < before {
            DeleteOutcome {
                success: true,
                message: "Patient deleted successfully".into(),
            }
        } else {
            DeleteOutcome {
                success: false,
                message: "Patient not found".into(),
            }
        })
    }
}
