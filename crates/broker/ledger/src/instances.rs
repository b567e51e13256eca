//! Instance ledger
//!
//! Authoritative record of every service instance. All operations for one
//! instance id run under that id's lock; validation happens before the lock
//! is taken and never mutates anything.

use crate::error::{LedgerError, Result};
use crate::locks::LockMap;
use crate::provisioner::Provisioner;
use broker_catalog::{validate_parameters, Catalog};
use broker_types::{
    BindingId, CreateInstance, DeleteInstance, InstanceId, InstanceState, Plan, PlanId,
    ServiceId, ServiceInstance, UpdateInstance,
};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful (or replayed) instance creation
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub dashboard_url: Option<String>,

    /// True when an identical resubmission was answered from the record
    /// without touching the provisioner
    pub replayed: bool,
}

/// The instance lifecycle state machine
pub struct InstanceLedger {
    catalog: Arc<Catalog>,
    provisioner: Arc<dyn Provisioner>,
    records: DashMap<InstanceId, ServiceInstance>,
    bindings: DashMap<InstanceId, HashSet<BindingId>>,
    locks: LockMap,
}

impl InstanceLedger {
    pub fn new(catalog: Arc<Catalog>, provisioner: Arc<dyn Provisioner>) -> Self {
        Self {
            catalog,
            provisioner,
            records: DashMap::new(),
            bindings: DashMap::new(),
            locks: LockMap::new(),
        }
    }

    /// Current record for an instance id, if one is live
    pub fn get(&self, id: &InstanceId) -> Option<ServiceInstance> {
        self.records.get(id).map(|record| record.clone())
    }

    /// Number of live bindings registered against an instance
    pub fn live_bindings(&self, id: &InstanceId) -> usize {
        self.bindings.get(id).map(|set| set.len()).unwrap_or(0)
    }

    fn resolve_plan(&self, request_service: &ServiceId, request_plan: &PlanId) -> Result<&Plan> {
        let service = self
            .catalog
            .find_service(request_service)
            .ok_or_else(|| LedgerError::UnknownService(request_service.clone()))?;
        service
            .find_plan(request_plan)
            .ok_or_else(|| LedgerError::UnknownPlan {
                service_id: request_service.clone(),
                plan_id: request_plan.clone(),
            })
    }

    /// Provision a new instance, or replay/conflict an existing id
    pub async fn create(&self, id: InstanceId, request: CreateInstance) -> Result<CreateOutcome> {
        let plan = self.resolve_plan(&request.service_id, &request.plan_id)?;
        validate_parameters(plan, request.parameters.as_ref())?;

        let guard = self.locks.acquire(id.as_str()).await;

        if let Some(existing) = self.records.get(&id) {
            if request.matches_record(&existing) {
                debug!(instance_id = %id, "identical provision resubmission replayed");
                return Ok(CreateOutcome {
                    dashboard_url: existing.dashboard_url.clone(),
                    replayed: true,
                });
            }
            return Err(LedgerError::Conflict {
                id: id.to_string(),
                detail: divergence(&request, &existing),
            });
        }

        let now = chrono::Utc::now();
        let parameters = request.effective_parameters();
        let instance = ServiceInstance {
            id: id.clone(),
            service_id: request.service_id,
            plan_id: request.plan_id,
            parameters,
            organization_guid: request.organization_guid,
            space_guid: request.space_guid,
            context: request.context,
            state: InstanceState::Provisioning,
            dashboard_url: None,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(id.clone(), instance.clone());

        match self.provisioner.provision(&instance).await {
            Ok(resource) => {
                if let Some(mut record) = self.records.get_mut(&id) {
                    record.state = InstanceState::Provisioned;
                    record.dashboard_url = resource.dashboard_url.clone();
                    record.updated_at = chrono::Utc::now();
                }
                info!(instance_id = %id, "service instance provisioned");
                Ok(CreateOutcome {
                    dashboard_url: resource.dashboard_url,
                    replayed: false,
                })
            }
            Err(err) => {
                // roll back: no partial PROVISIONING record stays visible
                self.records.remove(&id);
                drop(guard);
                self.locks.reclaim(id.as_str());
                warn!(instance_id = %id, error = %err, "provisioning failed, record rolled back");
                Err(err.into())
            }
        }
    }

    /// Apply a new plan and/or parameters to a provisioned instance
    pub async fn update(&self, id: InstanceId, request: UpdateInstance) -> Result<()> {
        let plan = self.resolve_plan(&request.service_id, &request.plan_id)?;
        validate_parameters(plan, request.parameters.as_ref())?;

        let _guard = self.locks.acquire(id.as_str()).await;

        let previous = match self.records.get(&id) {
            Some(record) if record.state.is_provisioned() => record.clone(),
            _ => return Err(LedgerError::InstanceNotFound(id)),
        };

        if previous.service_id != request.service_id {
            return Err(LedgerError::ServiceMismatch(id));
        }

        if previous.plan_id != request.plan_id {
            let service = self
                .catalog
                .find_service(&request.service_id)
                .ok_or_else(|| LedgerError::UnknownService(request.service_id.clone()))?;
            if !service.plan_updateable {
                return Err(LedgerError::PlanNotUpdateable(id));
            }
        }

        let mut candidate = previous.clone();
        candidate.parameters = request.effective_parameters();
        candidate.plan_id = request.plan_id;
        candidate.state = InstanceState::Updating;
        self.records.insert(id.clone(), candidate.clone());

        match self.provisioner.update(&candidate).await {
            Ok(()) => {
                if let Some(mut record) = self.records.get_mut(&id) {
                    record.state = InstanceState::Provisioned;
                    record.updated_at = chrono::Utc::now();
                }
                info!(instance_id = %id, plan_id = %candidate.plan_id, "service instance updated");
                Ok(())
            }
            Err(err) => {
                // no partial apply: the previous record comes back verbatim
                self.records.insert(id.clone(), previous);
                warn!(instance_id = %id, error = %err, "update failed, previous record restored");
                Err(err.into())
            }
        }
    }

    /// Tear an instance down and free its id for reuse
    pub async fn delete(&self, id: InstanceId, request: DeleteInstance) -> Result<()> {
        self.resolve_plan(&request.service_id, &request.plan_id)?;

        let guard = self.locks.acquire(id.as_str()).await;

        let existing = match self.records.get(&id) {
            Some(record) => record.clone(),
            None => return Err(LedgerError::InstanceNotFound(id)),
        };

        if existing.service_id != request.service_id || existing.plan_id != request.plan_id {
            // surfaced as not-found per protocol convention, logged apart
            warn!(
                instance_id = %id,
                supplied_service = %request.service_id,
                supplied_plan = %request.plan_id,
                "deprovision coordinates do not match the stored record"
            );
            return Err(LedgerError::InstanceNotFound(id));
        }

        let live = self.live_bindings(&id);
        if live > 0 {
            return Err(LedgerError::InstanceHasBindings { id, live });
        }

        if let Some(mut record) = self.records.get_mut(&id) {
            record.state = InstanceState::Deprovisioning;
        }

        match self.provisioner.deprovision(&existing).await {
            Ok(()) => {
                self.records.remove(&id);
                self.bindings.remove(&id);
                drop(guard);
                self.locks.reclaim(id.as_str());
                info!(instance_id = %id, "service instance deprovisioned");
                Ok(())
            }
            Err(err) => {
                if let Some(mut record) = self.records.get_mut(&id) {
                    record.state = InstanceState::Provisioned;
                }
                warn!(instance_id = %id, error = %err, "deprovision failed, instance kept");
                Err(err.into())
            }
        }
    }

    /// Reserve a binding slot against a provisioned instance
    ///
    /// Runs under the instance lock, so a concurrent deprovision either sees
    /// the reservation and rejects, or completes first and the bind fails
    /// with not-found. Returns the owning record for coordinate checks.
    pub(crate) async fn register_binding(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
    ) -> Result<ServiceInstance> {
        let _guard = self.locks.acquire(instance_id.as_str()).await;

        let record = match self.records.get(instance_id) {
            Some(record) if record.state.is_provisioned() => record.clone(),
            _ => return Err(LedgerError::InstanceNotFound(instance_id.clone())),
        };

        self.bindings
            .entry(instance_id.clone())
            .or_default()
            .insert(binding_id.clone());
        Ok(record)
    }

    /// Release a binding slot after unbind or a failed bind
    pub(crate) async fn deregister_binding(&self, instance_id: &InstanceId, binding_id: &BindingId) {
        let _guard = self.locks.acquire(instance_id.as_str()).await;

        if let Some(mut set) = self.bindings.get_mut(instance_id) {
            set.remove(binding_id);
        }
        self.bindings.remove_if(instance_id, |_, set| set.is_empty());
    }
}

fn divergence(request: &CreateInstance, existing: &ServiceInstance) -> String {
    if request.service_id != existing.service_id {
        "service_id".to_string()
    } else if request.plan_id != existing.plan_id {
        "plan_id".to_string()
    } else {
        "parameters".to_string()
    }
}
