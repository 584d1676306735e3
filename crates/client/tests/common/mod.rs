//! In-process transport executing the real schema over the in-memory store.

use std::sync::Arc;

use async_graphql::{Request, Variables};
use async_trait::async_trait;
use chrono::NaiveDate;

use patientdesk_client::{GraphqlPatientGateway, GraphqlRequest, GraphqlResponse, GraphqlTransport};
use patientdesk_core::error::{GatewayError, GatewayResult};
use patientdesk_graphql::{PatientSchema, build_schema};
use patientdesk_storage::InMemoryPatientRepository;
use patientdesk_storage::memory::seed::generate;

pub struct SchemaTransport {
    schema: PatientSchema,
}

#[async_trait]
impl GraphqlTransport for SchemaTransport {
    async fn execute(&self, request: GraphqlRequest) -> GatewayResult<GraphqlResponse> {
        let response = self
            .schema
            .execute(Request::new(request.query).variables(Variables::from_json(request.variables)))
            .await;
        let body =
            serde_json::to_value(&response).map_err(|e| GatewayError::Decode(e.to_string()))?;
        serde_json::from_value(body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Gateway over a server seeded with `count` generated patients.
pub fn gateway(count: usize) -> Arc<GraphqlPatientGateway<SchemaTransport>> {
    let repo = InMemoryPatientRepository::with_patients(generate(count))
        .unwrap()
        .pinned_to(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    let schema = build_schema(Arc::new(repo));
    Arc::new(GraphqlPatientGateway::new(SchemaTransport { schema }))
}
