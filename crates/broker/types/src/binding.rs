//! Service binding records, states, and issued credentials

use crate::ids::{BindingId, InstanceId, PlanId, ServiceId};
use crate::instance::Parameters;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A credential grant linking an application to a service instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceBinding {
    /// Platform-assigned binding identifier
    pub id: BindingId,

    /// Owning service instance
    pub instance_id: InstanceId,

    /// Service id, always equal to the owning instance's
    pub service_id: ServiceId,

    /// Plan id at bind time
    pub plan_id: PlanId,

    /// Application the credentials are issued for, when the platform sends one
    pub app_guid: Option<String>,

    /// Bind-resource object, stored verbatim
    pub bind_resource: Value,

    /// Last parameter object that passed schema validation
    pub parameters: Parameters,

    /// Issued credentials; present once the binding reaches `Bound`
    pub credentials: Option<Credentials>,

    /// Current lifecycle state
    pub state: BindingState,

    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Binding lifecycle state
///
/// Absence from the ledger is the implicit ABSENT state; the transient
/// states are only held while the per-binding lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    /// Credentials are being issued by the provisioner
    Binding,

    /// The binding is live and its credentials are valid
    Bound,

    /// Credentials are being revoked
    Unbinding,
}

impl BindingState {
    pub fn is_bound(&self) -> bool {
        matches!(self, BindingState::Bound)
    }
}

/// Credentials issued for a binding
///
/// Every successful bind produces fresh random material; credentials are
/// never derived from request inputs and never shared across bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,

    /// Provisioner-specific extras (connection URI, host, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_flatten_extras_on_the_wire() {
        let mut extra = serde_json::Map::new();
        extra.insert("uri".to_string(), json!("demo://u@host/db"));
        let credentials = Credentials {
            username: "u".to_string(),
            password: "p".to_string(),
            extra,
        };

        let value = serde_json::to_value(&credentials).unwrap();
        assert_eq!(value["username"], json!("u"));
        assert_eq!(value["uri"], json!("demo://u@host/db"));
    }
}
