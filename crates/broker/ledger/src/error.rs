//! Ledger error taxonomy
//!
//! Four caller-visible classes: validation failures and conflicts are
//! detected before any mutation; not-found covers absent records and
//! stored-coordinate mismatches (the protocol surfaces both as bad
//! requests, the distinction is kept for diagnostics); provisioner
//! failures are the only class where a rollback has happened and a caller
//! retry is meaningful.

use crate::provisioner::ProvisionerError;
use broker_catalog::ParameterFault;
use broker_types::{BindingId, InstanceId, PlanId, ServiceId};
use thiserror::Error;

/// Errors produced by the instance and binding ledgers
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unknown service '{0}'")]
    UnknownService(ServiceId),

    #[error("unknown plan '{plan_id}' for service '{service_id}'")]
    UnknownPlan {
        service_id: ServiceId,
        plan_id: PlanId,
    },

    #[error(transparent)]
    Parameters(#[from] ParameterFault),

    #[error("service '{0}' does not accept bindings")]
    NotBindable(ServiceId),

    #[error("plan of instance '{0}' cannot be changed: service is not plan-updateable")]
    PlanNotUpdateable(InstanceId),

    #[error("instance '{0}' belongs to a different service")]
    ServiceMismatch(InstanceId),

    #[error("binding '{0}' must use the plan of its owning instance")]
    PlanMismatch(BindingId),

    #[error("instance '{id}' still has {live} live bindings")]
    InstanceHasBindings { id: InstanceId, live: usize },

    #[error("resubmission for '{id}' diverges from the existing record: {detail}")]
    Conflict { id: String, detail: String },

    #[error("instance '{0}' not found")]
    InstanceNotFound(InstanceId),

    #[error("binding '{0}' not found")]
    BindingNotFound(BindingId),

    #[error(transparent)]
    Provisioner(#[from] ProvisionerError),
}

/// Caller-visible failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Bad request detected before touching a ledger; no mutation occurred
    Validation,

    /// Divergent resubmission of a live id; the original record is untouched
    Conflict,

    /// The addressed record does not exist (or its stored coordinates do
    /// not match the request)
    NotFound,

    /// The backing-resource call failed; the record was rolled back
    Provisioner,
}

impl LedgerError {
    /// Classify this error for protocol mapping
    pub fn class(&self) -> FaultClass {
        match self {
            LedgerError::UnknownService(_)
            | LedgerError::UnknownPlan { .. }
            | LedgerError::Parameters(_)
            | LedgerError::NotBindable(_)
            | LedgerError::PlanNotUpdateable(_)
            | LedgerError::ServiceMismatch(_)
            | LedgerError::PlanMismatch(_)
            | LedgerError::InstanceHasBindings { .. } => FaultClass::Validation,
            LedgerError::Conflict { .. } => FaultClass::Conflict,
            LedgerError::InstanceNotFound(_) | LedgerError::BindingNotFound(_) => {
                FaultClass::NotFound
            }
            LedgerError::Provisioner(_) => FaultClass::Provisioner,
        }
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_classify_into_protocol_categories() {
        assert_eq!(
            LedgerError::UnknownService(ServiceId::new("x")).class(),
            FaultClass::Validation
        );
        assert_eq!(
            LedgerError::Conflict {
                id: "i".to_string(),
                detail: "plan".to_string()
            }
            .class(),
            FaultClass::Conflict
        );
        assert_eq!(
            LedgerError::InstanceNotFound(InstanceId::new("i")).class(),
            FaultClass::NotFound
        );
        assert_eq!(
            LedgerError::Provisioner(ProvisionerError::Backend("down".to_string())).class(),
            FaultClass::Provisioner
        );
    }
}
