//! Provisioner boundary
//!
//! The ledgers manage lifecycle metadata; the backing resource itself is
//! behind this capability. Implementations may be long-running network
//! calls — they execute while the caller holds only the per-id lock of the
//! instance or binding being served, so unrelated work is never blocked.

use async_trait::async_trait;
use broker_types::{BindingId, Credentials, ServiceBinding, ServiceInstance};
use thiserror::Error;

/// What the provisioner yields for a freshly allocated resource
#[derive(Debug, Clone)]
pub struct ProvisionedResource {
    /// Management dashboard for the instance, if the backend offers one
    pub dashboard_url: Option<String>,
}

/// Failures from the backing-resource manager
#[derive(Debug, Error)]
pub enum ProvisionerError {
    /// The call to the backing resource failed
    #[error("backing resource call failed: {0}")]
    Backend(String),

    /// The backing resource refused the request
    #[error("backing resource rejected the request: {0}")]
    Rejected(String),
}

/// Abstract backing-resource manager
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Allocate the resource for a new instance
    async fn provision(
        &self,
        instance: &ServiceInstance,
    ) -> Result<ProvisionedResource, ProvisionerError>;

    /// Apply updated plan/parameters to an existing resource
    async fn update(&self, instance: &ServiceInstance) -> Result<(), ProvisionerError>;

    /// Tear the resource down
    async fn deprovision(&self, instance: &ServiceInstance) -> Result<(), ProvisionerError>;

    /// Issue fresh credentials for a binding
    async fn bind(
        &self,
        instance: &ServiceInstance,
        binding_id: &BindingId,
    ) -> Result<Credentials, ProvisionerError>;

    /// Invalidate a binding's credentials
    async fn unbind(&self, binding: &ServiceBinding) -> Result<(), ProvisionerError>;
}
