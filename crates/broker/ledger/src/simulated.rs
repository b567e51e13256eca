//! Simulated provisioner
//!
//! Suitable for development and tests. Allocation is an in-memory mark;
//! credentials are fresh random material per bind, never derived from the
//! request, so two bindings with identical inputs still get distinct
//! secrets.

use crate::provisioner::{ProvisionedResource, Provisioner, ProvisionerError};
use async_trait::async_trait;
use broker_types::{BindingId, Credentials, InstanceId, ServiceBinding, ServiceInstance};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory backing-resource manager
pub struct SimulatedProvisioner {
    dashboard_base: String,
    resources: DashMap<InstanceId, ()>,
    provision_calls: AtomicU64,
    bind_calls: AtomicU64,
}

impl SimulatedProvisioner {
    pub fn new() -> Self {
        Self::with_dashboard_base("https://dashboard.broker.local")
    }

    pub fn with_dashboard_base(base: impl Into<String>) -> Self {
        Self {
            dashboard_base: base.into(),
            resources: DashMap::new(),
            provision_calls: AtomicU64::new(0),
            bind_calls: AtomicU64::new(0),
        }
    }

    /// Number of live simulated resources
    pub fn live_resources(&self) -> usize {
        self.resources.len()
    }

    /// Total allocation calls, for asserting side-effect counts in tests
    pub fn provision_calls(&self) -> u64 {
        self.provision_calls.load(Ordering::SeqCst)
    }

    pub fn bind_calls(&self) -> u64 {
        self.bind_calls.load(Ordering::SeqCst)
    }

    fn random_token(len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

impl Default for SimulatedProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provisioner for SimulatedProvisioner {
    async fn provision(
        &self,
        instance: &ServiceInstance,
    ) -> Result<ProvisionedResource, ProvisionerError> {
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        self.resources.insert(instance.id.clone(), ());
        Ok(ProvisionedResource {
            dashboard_url: Some(format!(
                "{}/instances/{}",
                self.dashboard_base, instance.id
            )),
        })
    }

    async fn update(&self, instance: &ServiceInstance) -> Result<(), ProvisionerError> {
        if self.resources.contains_key(&instance.id) {
            Ok(())
        } else {
            Err(ProvisionerError::Backend(format!(
                "no resource allocated for instance '{}'",
                instance.id
            )))
        }
    }

    async fn deprovision(&self, instance: &ServiceInstance) -> Result<(), ProvisionerError> {
        self.resources.remove(&instance.id);
        Ok(())
    }

    async fn bind(
        &self,
        instance: &ServiceInstance,
        _binding_id: &BindingId,
    ) -> Result<Credentials, ProvisionerError> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        let username = format!("u-{}", Self::random_token(12).to_lowercase());
        let password = Self::random_token(32);

        let mut extra = serde_json::Map::new();
        extra.insert(
            "uri".to_string(),
            serde_json::Value::String(format!("demo://{}@{}/db", username, instance.id)),
        );

        Ok(Credentials {
            username,
            password,
            extra,
        })
    }

    async fn unbind(&self, _binding: &ServiceBinding) -> Result<(), ProvisionerError> {
        Ok(())
    }
}
