//! Broker Types - Core types for the service broker control plane
//!
//! The broker exposes the Open Service Broker protocol to a platform
//! orchestrator. This crate holds the data model shared by every layer:
//!
//! ## Architectural Boundaries
//!
//! - **Catalog** types are immutable after process initialization and are
//!   only ever read.
//! - **ServiceInstance** records are owned exclusively by the instance
//!   ledger; **ServiceBinding** records by the binding ledger.
//! - **Request** types are the decoded form of protocol requests; the
//!   transport layer produces them, the ledgers consume them.
//!
//! ## Key Concepts
//!
//! - **Service/Plan**: the catalog offerings and their purchasable variants
//! - **ParameterSchema**: a per-plan validation rule set, evaluated
//!   generically so new plans add data, not logic
//! - **ServiceInstance/ServiceBinding**: the lifecycle records, each with an
//!   explicit state machine state
//! - **Idempotent replay**: request types know how to compare themselves
//!   structurally against an existing record

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod binding;
pub mod catalog;
pub mod ids;
pub mod instance;
pub mod request;

// Re-export main types
pub use binding::{BindingState, Credentials, ServiceBinding};
pub use catalog::{FieldSpec, FieldType, ParameterSchema, Plan, Service};
pub use ids::{BindingId, InstanceId, PlanId, ServiceId};
pub use instance::{InstanceState, Parameters, ServiceInstance};
pub use request::{
    CreateBinding, CreateInstance, DeleteBinding, DeleteInstance, UpdateInstance,
};
