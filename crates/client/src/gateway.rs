//! `PatientGateway` over GraphQL.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use patientdesk_core::error::{GatewayError, GatewayResult};
use patientdesk_core::models::{
    CreatePatientInput, DeleteOutcome, Patient, PatientFilter, UpdatePatientInput,
};
use patientdesk_core::ports::{Cursor, PatientGateway, PatientPage};

use crate::queries::{CREATE_PATIENT, DELETE_PATIENT, GET_PATIENTS, UPDATE_PATIENT};
use crate::transport::{GraphqlRequest, GraphqlResponse, GraphqlTransport};

/// Patient API client implementing the `PatientGateway` port.
pub struct GraphqlPatientGateway<T: GraphqlTransport> {
    transport: T,
}

impl<T: GraphqlTransport> GraphqlPatientGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run an operation and decode `data.<field>`.
    async fn call<R: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> GatewayResult<R> {
        let response = self
            .transport
            .execute(GraphqlRequest::new(query, variables))
            .await?;
        let mut data = into_data(response)?;
        let value = data
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| GatewayError::Decode(format!("missing field `{}`", field)))?;
        serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Extract `data`, turning GraphQL errors into gateway errors.
///
/// Errors tagged `NOT_FOUND` become [`GatewayError::NotFound`].
fn into_data(response: GraphqlResponse) -> GatewayResult<Value> {
    if !response.errors.is_empty() {
        if let Some(err) = response
            .errors
            .iter()
            .find(|e| e.code() == Some("NOT_FOUND"))
        {
            return Err(GatewayError::NotFound(err.message.clone()));
        }
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(GatewayError::Api(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| GatewayError::Decode("response has neither data nor errors".into()))
}

/// `GetPatients` variables for one page.
fn page_variables(filter: &PatientFilter, page_size: u32, after: Option<&Cursor>) -> Value {
    let mut vars = Map::new();
    vars.insert("first".into(), json!(page_size));
    if let Some(cursor) = after {
        vars.insert("after".into(), json!(cursor.value));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim)
        && !search.is_empty()
    {
        vars.insert("search".into(), json!(search));
    }
    if let Some(status) = filter.status {
        vars.insert("status".into(), json!(status.as_str()));
    }
    if let Some(gender) = filter.gender {
        vars.insert("gender".into(), json!(gender.as_str()));
    }
    if let Some(range) = filter.age_range {
        vars.insert("ageRange".into(), json!({ "min": range.min, "max": range.max }));
    }
    Value::Object(vars)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionData {
    edges: Vec<EdgeData>,
    page_info: PageInfoData,
    total_count: u64,
}

#[derive(Deserialize)]
struct EdgeData {
    node: Patient,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfoData {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl From<ConnectionData> for PatientPage {
    fn from(conn: ConnectionData) -> Self {
        let next_cursor = if conn.page_info.has_next_page {
            conn.page_info.end_cursor.map(Cursor::new)
        } else {
            None
        };
        PatientPage {
            records: conn.edges.into_iter().map(|e| e.node).collect(),
            next_cursor,
            total_count: conn.total_count,
        }
    }
}

#[async_trait]
impl<T: GraphqlTransport> PatientGateway for GraphqlPatientGateway<T> {
    #[instrument(skip(self, filter))]
    async fn fetch_page(
        &self,
        filter: &PatientFilter,
        page_size: u32,
        after: Option<&Cursor>,
    ) -> GatewayResult<PatientPage> {
        let vars = page_variables(filter, page_size, after);
        let conn: ConnectionData = self.call(GET_PATIENTS, vars, "patients").await?;
        let page = PatientPage::from(conn);
        debug!(
            records = page.records.len(),
            total = page.total_count,
            "Fetched patient page"
        );
        Ok(page)
    }

    #[instrument(skip_all)]
    async fn create_patient(&self, input: &CreatePatientInput) -> GatewayResult<Patient> {
        self.call(CREATE_PATIENT, json!({ "input": input }), "createPatient")
            .await
    }

    #[instrument(skip(self, input))]
    async fn update_patient(&self, id: &str, input: &UpdatePatientInput) -> GatewayResult<Patient> {
        self.call(
            UPDATE_PATIENT,
            json!({ "id": id, "input": input }),
            "updatePatient",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_patient(&self, id: &str) -> GatewayResult<DeleteOutcome> {
        let outcome: DeleteOutcome = self
            .call(DELETE_PATIENT, json!({ "id": id }), "deletePatient")
            .await?;
        if !outcome.success {
            warn!(message = %outcome.message, "Delete rejected");
        }
        Ok(outcome)
    }
}
