//! Service instance handlers

use super::{decode_body, CoordinateQuery, EmptyResponse};
use crate::api::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use broker_types::{CreateInstance, DeleteInstance, InstanceId, UpdateInstance};
use serde::Serialize;
use serde_json::Value;

/// Provision response
#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub dashboard_url: Option<String>,
}

/// Provision a service instance (PUT, idempotent)
pub async fn provision_instance(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<ProvisionResponse>> {
    let request: CreateInstance = decode_body(body)?;
    let outcome = state
        .control
        .provision_instance(InstanceId::new(instance_id), request)
        .await?;

    Ok(Json(ProvisionResponse {
        dashboard_url: outcome.dashboard_url,
    }))
}

/// Update a service instance (PATCH)
pub async fn update_instance(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<EmptyResponse>> {
    let request: UpdateInstance = decode_body(body)?;
    state
        .control
        .update_instance(InstanceId::new(instance_id), request)
        .await?;

    Ok(Json(EmptyResponse::default()))
}

/// Deprovision a service instance (DELETE)
pub async fn deprovision_instance(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Query(query): Query<CoordinateQuery>,
) -> ApiResult<Json<EmptyResponse>> {
    let (service_id, plan_id) = query.require()?;
    state
        .control
        .deprovision_instance(
            InstanceId::new(instance_id),
            DeleteInstance {
                service_id,
                plan_id,
            },
        )
        .await?;

    Ok(Json(EmptyResponse::default()))
}
