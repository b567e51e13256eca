//! API request handlers

mod bindings;
mod catalog;
mod health;
mod instances;

pub use bindings::*;
pub use catalog::*;
pub use health::*;
pub use instances::*;

use crate::error::ApiError;
use axum::Json;
use broker_types::{PlanId, ServiceId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decode a JSON body into a typed request
///
/// The extractor gives `None` for an absent or undecodable body; both, and
/// a body missing required fields, are bad requests before any ledger call.
pub(crate) fn decode_body<T: DeserializeOwned>(body: Option<Json<Value>>) -> Result<T, ApiError> {
    let Json(value) =
        body.ok_or_else(|| ApiError::BadRequest("missing or undecodable request body".to_string()))?;
    serde_json::from_value(value)
        .map_err(|err| ApiError::BadRequest(format!("malformed request body: {err}")))
}

/// Query coordinates carried by delete requests
#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub service_id: Option<String>,
    pub plan_id: Option<String>,

    /// Accepted for protocol compatibility; deletes run synchronously
    #[serde(default)]
    pub accepts_incomplete: Option<bool>,
}

impl CoordinateQuery {
    /// Both coordinates are mandatory on delete requests
    pub(crate) fn require(self) -> Result<(ServiceId, PlanId), ApiError> {
        match (self.service_id, self.plan_id) {
            (Some(service_id), Some(plan_id))
                if !service_id.is_empty() && !plan_id.is_empty() =>
            {
                Ok((ServiceId::new(service_id), PlanId::new(plan_id)))
            }
            _ => Err(ApiError::BadRequest(
                "service_id and plan_id query parameters are required".to_string(),
            )),
        }
    }
}

/// Empty success body (`{}`), used by update and delete responses
#[derive(Debug, Default, Serialize)]
pub struct EmptyResponse {}
