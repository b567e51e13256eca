//! Main BrokerControlPlane implementation
//!
//! The unified entry point for every lifecycle operation. It wires the
//! immutable catalog, the two ledgers, and the provisioner together at
//! construction time and then only delegates.

use broker_catalog::Catalog;
use broker_ledger::{
    BindOutcome, BindingLedger, CreateOutcome, InstanceLedger, LedgerError, Provisioner,
};
use broker_types::{
    BindingId, CreateBinding, CreateInstance, DeleteBinding, DeleteInstance, InstanceId,
    UpdateInstance,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result type for control-plane operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified control plane for all broker lifecycle operations
pub struct BrokerControlPlane {
    catalog: Arc<Catalog>,
    instances: Arc<InstanceLedger>,
    bindings: Arc<BindingLedger>,
}

impl BrokerControlPlane {
    /// Create a control plane over the given catalog and provisioner
    pub fn new(catalog: Arc<Catalog>, provisioner: Arc<dyn Provisioner>) -> Self {
        let instances = Arc::new(InstanceLedger::new(catalog.clone(), provisioner.clone()));
        let bindings = Arc::new(BindingLedger::new(
            catalog.clone(),
            provisioner,
            instances.clone(),
        ));
        Self {
            catalog,
            instances,
            bindings,
        }
    }

    /// The immutable catalog served to the platform
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Provision a service instance (idempotent for identical retries)
    #[instrument(skip(self, request), fields(instance_id = %instance_id))]
    pub async fn provision_instance(
        &self,
        instance_id: InstanceId,
        request: CreateInstance,
    ) -> Result<CreateOutcome> {
        let outcome = self.instances.create(instance_id, request).await?;
        info!(replayed = outcome.replayed, "provision request completed");
        Ok(outcome)
    }

    /// Apply new plan/parameters to a provisioned instance
    #[instrument(skip(self, request), fields(instance_id = %instance_id))]
    pub async fn update_instance(
        &self,
        instance_id: InstanceId,
        request: UpdateInstance,
    ) -> Result<()> {
        self.instances.update(instance_id, request).await?;
        info!("update request completed");
        Ok(())
    }

    /// Tear a service instance down
    #[instrument(skip(self, request), fields(instance_id = %instance_id))]
    pub async fn deprovision_instance(
        &self,
        instance_id: InstanceId,
        request: DeleteInstance,
    ) -> Result<()> {
        self.instances.delete(instance_id, request).await?;
        info!("deprovision request completed");
        Ok(())
    }

    /// Create a binding and issue credentials (idempotent for identical
    /// retries; replay returns the originally issued credentials)
    #[instrument(skip(self, request), fields(instance_id = %instance_id, binding_id = %binding_id))]
    pub async fn create_binding(
        &self,
        instance_id: InstanceId,
        binding_id: BindingId,
        request: CreateBinding,
    ) -> Result<BindOutcome> {
        let outcome = self
            .bindings
            .create(binding_id, instance_id, request)
            .await?;
        info!(replayed = outcome.replayed, "bind request completed");
        Ok(outcome)
    }

    /// Revoke a binding's credentials
    #[instrument(skip(self, request), fields(instance_id = %instance_id, binding_id = %binding_id))]
    pub async fn delete_binding(
        &self,
        instance_id: InstanceId,
        binding_id: BindingId,
        request: DeleteBinding,
    ) -> Result<()> {
        self.bindings
            .delete(binding_id, instance_id, request)
            .await?;
        info!("unbind request completed");
        Ok(())
    }
}
