//! Binding ledger
//!
//! Authoritative record of every credential grant. A binding is reserved
//! against its owning instance (under the instance lock) before the
//! provisioner is asked for credentials, so an instance can never be
//! deprovisioned out from under a bind in flight. Lock order is always
//! binding-then-instance; instance operations never wait on binding locks.

use crate::error::{LedgerError, Result};
use crate::instances::InstanceLedger;
use crate::locks::LockMap;
use crate::provisioner::Provisioner;
use broker_catalog::{validate_parameters, Catalog};
use broker_types::{
    BindingId, BindingState, CreateBinding, Credentials, DeleteBinding, InstanceId,
    ServiceBinding,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful (or replayed) bind
#[derive(Debug, Clone)]
pub struct BindOutcome {
    pub credentials: Credentials,

    /// True when an identical resubmission was answered from the record
    pub replayed: bool,
}

/// The binding lifecycle state machine
pub struct BindingLedger {
    catalog: Arc<Catalog>,
    provisioner: Arc<dyn Provisioner>,
    instances: Arc<InstanceLedger>,
    records: DashMap<BindingId, ServiceBinding>,
    locks: LockMap,
}

impl BindingLedger {
    pub fn new(
        catalog: Arc<Catalog>,
        provisioner: Arc<dyn Provisioner>,
        instances: Arc<InstanceLedger>,
    ) -> Self {
        Self {
            catalog,
            provisioner,
            instances,
            records: DashMap::new(),
            locks: LockMap::new(),
        }
    }

    /// Current record for a binding id, if one is live
    pub fn get(&self, id: &BindingId) -> Option<ServiceBinding> {
        self.records.get(id).map(|record| record.clone())
    }

    /// Issue credentials for a new binding, or replay/conflict an existing id
    pub async fn create(
        &self,
        binding_id: BindingId,
        instance_id: InstanceId,
        request: CreateBinding,
    ) -> Result<BindOutcome> {
        let service = self
            .catalog
            .find_service(&request.service_id)
            .ok_or_else(|| LedgerError::UnknownService(request.service_id.clone()))?;
        let plan = service
            .find_plan(&request.plan_id)
            .ok_or_else(|| LedgerError::UnknownPlan {
                service_id: request.service_id.clone(),
                plan_id: request.plan_id.clone(),
            })?;
        if !service.bindable {
            return Err(LedgerError::NotBindable(request.service_id.clone()));
        }
        validate_parameters(plan, request.parameters.as_ref())?;

        let guard = self.locks.acquire(binding_id.as_str()).await;

        if let Some(existing) = self.records.get(&binding_id) {
            if existing.instance_id == instance_id && request.matches_record(&existing) {
                if let Some(credentials) = existing.credentials.clone() {
                    debug!(binding_id = %binding_id, "identical bind resubmission replayed");
                    return Ok(BindOutcome {
                        credentials,
                        replayed: true,
                    });
                }
            }
            return Err(LedgerError::Conflict {
                id: binding_id.to_string(),
                detail: "binding fields differ from the existing record".to_string(),
            });
        }

        // Reserve the slot before asking the backend for credentials; this
        // is what blocks a concurrent deprovision of the owning instance.
        let instance = self
            .instances
            .register_binding(&instance_id, &binding_id)
            .await?;

        if instance.service_id != request.service_id {
            self.release(&instance_id, &binding_id, guard).await;
            return Err(LedgerError::ServiceMismatch(instance_id));
        }
        if instance.plan_id != request.plan_id {
            self.release(&instance_id, &binding_id, guard).await;
            return Err(LedgerError::PlanMismatch(binding_id));
        }

        let binding = ServiceBinding {
            id: binding_id.clone(),
            instance_id: instance_id.clone(),
            service_id: request.service_id.clone(),
            plan_id: request.plan_id.clone(),
            app_guid: request.app_guid.clone(),
            bind_resource: request.bind_resource.clone(),
            parameters: request.effective_parameters(),
            credentials: None,
            state: BindingState::Binding,
            created_at: chrono::Utc::now(),
        };
        self.records.insert(binding_id.clone(), binding);

        match self.provisioner.bind(&instance, &binding_id).await {
            Ok(credentials) => {
                if let Some(mut record) = self.records.get_mut(&binding_id) {
                    record.credentials = Some(credentials.clone());
                    record.state = BindingState::Bound;
                }
                info!(binding_id = %binding_id, instance_id = %instance_id, "binding created");
                Ok(BindOutcome {
                    credentials,
                    replayed: false,
                })
            }
            Err(err) => {
                self.records.remove(&binding_id);
                self.release(&instance_id, &binding_id, guard).await;
                warn!(binding_id = %binding_id, error = %err, "bind failed, record rolled back");
                Err(err.into())
            }
        }
    }

    /// Revoke a binding's credentials and remove the record
    pub async fn delete(
        &self,
        binding_id: BindingId,
        instance_id: InstanceId,
        request: DeleteBinding,
    ) -> Result<()> {
        let service = self
            .catalog
            .find_service(&request.service_id)
            .ok_or_else(|| LedgerError::UnknownService(request.service_id.clone()))?;
        service
            .find_plan(&request.plan_id)
            .ok_or_else(|| LedgerError::UnknownPlan {
                service_id: request.service_id.clone(),
                plan_id: request.plan_id.clone(),
            })?;

        let guard = self.locks.acquire(binding_id.as_str()).await;

        let existing = match self.records.get(&binding_id) {
            Some(record) => record.clone(),
            None => return Err(LedgerError::BindingNotFound(binding_id)),
        };

        if existing.instance_id != instance_id
            || existing.service_id != request.service_id
            || existing.plan_id != request.plan_id
        {
            // surfaced as not-found per protocol convention, logged apart
            warn!(
                binding_id = %binding_id,
                supplied_instance = %instance_id,
                supplied_service = %request.service_id,
                supplied_plan = %request.plan_id,
                "unbind coordinates do not match the stored record"
            );
            return Err(LedgerError::BindingNotFound(binding_id));
        }

        if let Some(mut record) = self.records.get_mut(&binding_id) {
            record.state = BindingState::Unbinding;
        }

        match self.provisioner.unbind(&existing).await {
            Ok(()) => {
                self.records.remove(&binding_id);
                self.instances
                    .deregister_binding(&instance_id, &binding_id)
                    .await;
                drop(guard);
                self.locks.reclaim(binding_id.as_str());
                info!(binding_id = %binding_id, instance_id = %instance_id, "binding deleted");
                Ok(())
            }
            Err(err) => {
                if let Some(mut record) = self.records.get_mut(&binding_id) {
                    record.state = BindingState::Bound;
                }
                warn!(binding_id = %binding_id, error = %err, "unbind failed, binding kept");
                Err(err.into())
            }
        }
    }

    /// Undo a reservation after a failed or rejected bind
    async fn release(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        guard: tokio::sync::OwnedMutexGuard<()>,
    ) {
        self.instances
            .deregister_binding(instance_id, binding_id)
            .await;
        drop(guard);
        self.locks.reclaim(binding_id.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedProvisioner;
    use broker_types::{
        CreateInstance, DeleteInstance, FieldSpec, FieldType, ParameterSchema, Plan, PlanId,
        Service, ServiceId,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    fn demo_catalog(bindable: bool) -> Arc<Catalog> {
        let service_id = ServiceId::new("svc");
        let mut fields = BTreeMap::new();
        fields.insert(
            "name".to_string(),
            FieldSpec {
                field_type: FieldType::String,
                required: true,
                allowed: None,
            },
        );

        Arc::new(Catalog::new(vec![Service {
            id: service_id.clone(),
            name: "demo-service".to_string(),
            description: "demo".to_string(),
            tags: vec![],
            bindable,
            plan_updateable: true,
            plans: vec![
                Plan {
                    id: PlanId::new("simple"),
                    service_id: service_id.clone(),
                    name: "simple".to_string(),
                    description: "no schema".to_string(),
                    free: true,
                    schema: None,
                },
                Plan {
                    id: PlanId::new("complex"),
                    service_id,
                    name: "complex".to_string(),
                    description: "requires a name".to_string(),
                    free: true,
                    schema: Some(ParameterSchema { fields }),
                },
            ],
        }]))
    }

    struct Harness {
        provisioner: Arc<SimulatedProvisioner>,
        instances: Arc<InstanceLedger>,
        bindings: BindingLedger,
    }

    fn harness(bindable: bool) -> Harness {
        let catalog = demo_catalog(bindable);
        let provisioner = Arc::new(SimulatedProvisioner::new());
        let instances = Arc::new(InstanceLedger::new(
            catalog.clone(),
            provisioner.clone(),
        ));
        let bindings = BindingLedger::new(catalog, provisioner.clone(), instances.clone());
        Harness {
            provisioner,
            instances,
            bindings,
        }
    }

    fn create_instance_request() -> CreateInstance {
        serde_json::from_value(json!({
            "service_id": "svc",
            "plan_id": "simple",
            "parameters": {},
            "organization_guid": "org",
            "space_guid": "space"
        }))
        .unwrap()
    }

    fn bind_request() -> CreateBinding {
        serde_json::from_value(json!({
            "service_id": "svc",
            "plan_id": "simple",
            "app_guid": "app",
            "bind_resource": {},
            "parameters": {}
        }))
        .unwrap()
    }

    fn unbind_request() -> DeleteBinding {
        serde_json::from_value(json!({
            "service_id": "svc",
            "plan_id": "simple"
        }))
        .unwrap()
    }

    async fn provisioned_instance(h: &Harness, id: &str) -> InstanceId {
        let instance_id = InstanceId::new(id);
        h.instances
            .create(instance_id.clone(), create_instance_request())
            .await
            .unwrap();
        instance_id
    }

    #[tokio::test]
    async fn bind_issues_username_and_password() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;

        let outcome = h
            .bindings
            .create(BindingId::new("b-1"), instance_id, bind_request())
            .await
            .unwrap();

        assert!(!outcome.replayed);
        assert!(!outcome.credentials.username.is_empty());
        assert!(!outcome.credentials.password.is_empty());

        let record = h.bindings.get(&BindingId::new("b-1")).unwrap();
        assert!(record.state.is_bound());
    }

    #[tokio::test]
    async fn bind_requires_a_live_instance() {
        let h = harness(true);

        let err = h
            .bindings
            .create(
                BindingId::new("b-1"),
                InstanceId::new("never-created"),
                bind_request(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InstanceNotFound(_)));
        assert!(h.bindings.get(&BindingId::new("b-1")).is_none());
        assert_eq!(h.provisioner.bind_calls(), 0);
    }

    #[tokio::test]
    async fn bind_after_instance_deletion_is_not_found() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;

        let delete: DeleteInstance = serde_json::from_value(json!({
            "service_id": "svc",
            "plan_id": "simple"
        }))
        .unwrap();
        h.instances.delete(instance_id.clone(), delete).await.unwrap();

        let err = h
            .bindings
            .create(BindingId::new("b-1"), instance_id, bind_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InstanceNotFound(_)));
    }

    #[tokio::test]
    async fn identical_rebind_replays_the_original_credentials() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;
        let binding_id = BindingId::new("b-1");

        let first = h
            .bindings
            .create(binding_id.clone(), instance_id.clone(), bind_request())
            .await
            .unwrap();
        let second = h
            .bindings
            .create(binding_id, instance_id, bind_request())
            .await
            .unwrap();

        assert!(second.replayed);
        assert_eq!(first.credentials, second.credentials);
        assert_eq!(h.provisioner.bind_calls(), 1);
    }

    #[tokio::test]
    async fn divergent_rebind_conflicts() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;
        let binding_id = BindingId::new("b-1");

        h.bindings
            .create(binding_id.clone(), instance_id.clone(), bind_request())
            .await
            .unwrap();

        let mut divergent = bind_request();
        divergent.app_guid = Some("other-app".to_string());
        let err = h
            .bindings
            .create(binding_id, instance_id, divergent)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict { .. }));
    }

    #[tokio::test]
    async fn unbindable_services_reject_bindings() {
        let h = harness(false);
        let instance_id = provisioned_instance(&h, "i-1").await;

        let err = h
            .bindings
            .create(BindingId::new("b-1"), instance_id, bind_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotBindable(_)));
    }

    #[tokio::test]
    async fn binding_plan_must_match_the_instance_plan() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;

        let mut request = bind_request();
        request.plan_id = PlanId::new("complex");
        request.parameters = Some(json!({"name": "x"}).as_object().cloned().unwrap());
        let err = h
            .bindings
            .create(BindingId::new("b-1"), instance_id.clone(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PlanMismatch(_)));

        // the failed bind must not leave a reservation behind
        assert_eq!(h.instances.live_bindings(&instance_id), 0);
    }

    #[tokio::test]
    async fn unbind_requires_matching_coordinates() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;
        let binding_id = BindingId::new("b-1");

        h.bindings
            .create(binding_id.clone(), instance_id.clone(), bind_request())
            .await
            .unwrap();

        let mut request = unbind_request();
        request.plan_id = PlanId::new("complex");
        let err = h
            .bindings
            .delete(binding_id.clone(), instance_id.clone(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BindingNotFound(_)));
        assert!(h.bindings.get(&binding_id).is_some());

        h.bindings
            .delete(binding_id.clone(), instance_id.clone(), unbind_request())
            .await
            .unwrap();
        assert!(h.bindings.get(&binding_id).is_none());
        assert_eq!(h.instances.live_bindings(&instance_id), 0);

        // repeating the unbind is a not-found
        let err = h
            .bindings
            .delete(binding_id, instance_id, unbind_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BindingNotFound(_)));
    }

    #[tokio::test]
    async fn live_binding_blocks_instance_deletion_until_unbound() {
        let h = harness(true);
        let instance_id = provisioned_instance(&h, "i-1").await;
        let binding_id = BindingId::new("b-1");

        h.bindings
            .create(binding_id.clone(), instance_id.clone(), bind_request())
            .await
            .unwrap();

        let delete: DeleteInstance = serde_json::from_value(json!({
            "service_id": "svc",
            "plan_id": "simple"
        }))
        .unwrap();
        let err = h
            .instances
            .delete(instance_id.clone(), delete.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InstanceHasBindings { .. }));

        h.bindings
            .delete(binding_id, instance_id.clone(), unbind_request())
            .await
            .unwrap();
        h.instances.delete(instance_id, delete).await.unwrap();
    }
}
