//! Service binding handlers

use super::{decode_body, CoordinateQuery, EmptyResponse};
use crate::api::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use broker_types::{BindingId, CreateBinding, Credentials, DeleteBinding, InstanceId};
use serde::Serialize;
use serde_json::Value;

/// Bind response carrying the issued credentials
#[derive(Debug, Serialize)]
pub struct BindingResponse {
    pub credentials: Credentials,
}

/// Create a service binding (PUT, idempotent)
pub async fn create_binding(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<BindingResponse>> {
    let request: CreateBinding = decode_body(body)?;
    let outcome = state
        .control
        .create_binding(
            InstanceId::new(instance_id),
            BindingId::new(binding_id),
            request,
        )
        .await?;

    Ok(Json(BindingResponse {
        credentials: outcome.credentials,
    }))
}

/// Delete a service binding (DELETE)
pub async fn delete_binding(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    Query(query): Query<CoordinateQuery>,
) -> ApiResult<Json<EmptyResponse>> {
    let (service_id, plan_id) = query.require()?;
    state
        .control
        .delete_binding(
            InstanceId::new(instance_id),
            BindingId::new(binding_id),
            DeleteBinding {
                service_id,
                plan_id,
            },
        )
        .await?;

    Ok(Json(EmptyResponse::default()))
}
