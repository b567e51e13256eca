//! Decoded lifecycle request shapes
//!
//! The transport layer decodes protocol bodies into these types before the
//! control plane sees them; a body missing a required field never reaches a
//! ledger. Each mutating request knows how to compare itself structurally
//! against an existing record, which is what makes orchestrator retries
//! idempotent: "same request as before" means the full set of semantically
//! significant fields matches, not just the id.

use crate::binding::ServiceBinding;
use crate::ids::{PlanId, ServiceId};
use crate::instance::{Parameters, ServiceInstance};
use serde::Deserialize;
use serde_json::Value;

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Decoded provision request for a service instance
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstance {
    pub service_id: ServiceId,
    pub plan_id: PlanId,

    #[serde(default)]
    pub parameters: Option<Parameters>,

    pub organization_guid: String,
    pub space_guid: String,

    #[serde(default = "empty_object")]
    pub context: Value,

    /// Accepted for protocol compatibility; this broker provisions
    /// synchronously.
    #[serde(default)]
    pub accepts_incomplete: bool,
}

impl CreateInstance {
    /// Parameters as stored on the record: absent means empty
    pub fn effective_parameters(&self) -> Parameters {
        self.parameters.clone().unwrap_or_default()
    }

    /// Structural equality against an existing record, for idempotent replay
    pub fn matches_record(&self, record: &ServiceInstance) -> bool {
        self.service_id == record.service_id
            && self.plan_id == record.plan_id
            && self.effective_parameters() == record.parameters
    }
}

/// Decoded update request for a service instance
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInstance {
    pub service_id: ServiceId,
    pub plan_id: PlanId,

    #[serde(default)]
    pub parameters: Option<Parameters>,
}

impl UpdateInstance {
    pub fn effective_parameters(&self) -> Parameters {
        self.parameters.clone().unwrap_or_default()
    }
}

/// Decoded deprovision request; ids arrive as query parameters on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteInstance {
    pub service_id: ServiceId,
    pub plan_id: PlanId,
}

/// Decoded bind request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBinding {
    pub service_id: ServiceId,
    pub plan_id: PlanId,

    #[serde(default)]
    pub app_guid: Option<String>,

    #[serde(default = "empty_object")]
    pub bind_resource: Value,

    #[serde(default)]
    pub parameters: Option<Parameters>,
}

impl CreateBinding {
    pub fn effective_parameters(&self) -> Parameters {
        self.parameters.clone().unwrap_or_default()
    }

    /// Structural equality against an existing binding, for idempotent replay
    pub fn matches_record(&self, record: &ServiceBinding) -> bool {
        self.service_id == record.service_id
            && self.plan_id == record.plan_id
            && self.app_guid == record.app_guid
            && self.bind_resource == record.bind_resource
            && self.effective_parameters() == record.parameters
    }
}

/// Decoded unbind request; ids arrive as query parameters on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteBinding {
    pub service_id: ServiceId,
    pub plan_id: PlanId,
}
