//! Service instance records and lifecycle states
//!
//! A ServiceInstance is the broker's authoritative record of a provisioned
//! occurrence of a plan. The record is owned by the instance ledger; nothing
//! else mutates it.

use crate::ids::{InstanceId, PlanId, ServiceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied parameter object, always a flat keyed structure
pub type Parameters = serde_json::Map<String, Value>;

/// A provisioned service instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Platform-assigned instance identifier
    pub id: InstanceId,

    /// Catalog service this instance belongs to
    pub service_id: ServiceId,

    /// Plan currently applied
    pub plan_id: PlanId,

    /// Last parameter object that passed schema validation
    pub parameters: Parameters,

    /// Owning organization
    pub organization_guid: String,

    /// Owning space
    pub space_guid: String,

    /// Platform context object, stored verbatim
    pub context: Value,

    /// Current lifecycle state
    pub state: InstanceState,

    /// Dashboard URL yielded by the provisioner, if any
    pub dashboard_url: Option<String>,

    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Last successful mutation timestamp
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Instance lifecycle state
///
/// Absence from the ledger is the implicit ABSENT state. The transient
/// states are held only while the per-instance lock is held, so competing
/// requests for the same id never observe them; they exist so a failed
/// provisioner call can be rolled back to a well-defined prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// The backing resource is being allocated
    Provisioning,

    /// The instance is live and may be updated, bound, or deprovisioned
    Provisioned,

    /// New plan/parameters are being applied
    Updating,

    /// The backing resource is being torn down
    Deprovisioning,
}

impl InstanceState {
    /// Whether the instance is settled and accepts new lifecycle operations
    pub fn is_provisioned(&self) -> bool {
        matches!(self, InstanceState::Provisioned)
    }

    /// Whether the state is one of the in-flight transitions
    pub fn is_transitional(&self) -> bool {
        !self.is_provisioned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisioned_is_the_only_settled_state() {
        assert!(InstanceState::Provisioned.is_provisioned());
        assert!(InstanceState::Provisioning.is_transitional());
        assert!(InstanceState::Updating.is_transitional());
        assert!(InstanceState::Deprovisioning.is_transitional());
    }
}
