//! Immutable catalog registry
//!
//! Read-only after process initialization; safe for unlimited concurrent
//! readers. No side effects.

use broker_types::{Plan, PlanId, Service, ServiceId};

/// The set of offered services, in declaration order
#[derive(Debug, Clone)]
pub struct Catalog {
    services: Vec<Service>,
}

impl Catalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    /// Ordered services with their nested plans
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Look up a service by id
    pub fn find_service(&self, service_id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|service| &service.id == service_id)
    }

    /// Look up a plan by its service and plan ids
    pub fn find_plan(&self, service_id: &ServiceId, plan_id: &PlanId) -> Option<&Plan> {
        self.find_service(service_id)
            .and_then(|service| service.find_plan(plan_id))
    }
}
