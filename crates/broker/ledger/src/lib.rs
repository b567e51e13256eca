//! Broker Ledger - the lifecycle state machines
//!
//! The two ledgers are the authoritative record of every service instance
//! and binding. They enforce transition legality, idempotent replay of
//! orchestrator retries, and conflict detection, and they are the only code
//! that invokes the provisioner.
//!
//! ## Concurrency
//!
//! Every instance id and every binding id has its own mutual-exclusion
//! domain (a keyed lock created on demand and reclaimed after deletion).
//! Operations on unrelated ids run fully in parallel; duplicate requests
//! for the same id serialize, so a retry storm can never produce two
//! divergent provisioning side effects. Provisioner calls run while holding
//! only the per-id lock they serve.
//!
//! ## Rollback
//!
//! A failed provisioner call restores the record to its pre-operation
//! state: a half-provisioned instance is removed, a half-updated instance
//! gets its previous plan and parameters back, a half-deleted one returns
//! to `Provisioned`. Callers may retry; replay makes the retry safe.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod bindings;
pub mod error;
pub mod instances;
pub mod locks;
pub mod provisioner;
pub mod simulated;

pub use bindings::{BindOutcome, BindingLedger};
pub use error::{FaultClass, LedgerError};
pub use instances::{CreateOutcome, InstanceLedger};
pub use locks::LockMap;
pub use provisioner::{ProvisionedResource, Provisioner, ProvisionerError};
pub use simulated::SimulatedProvisioner;
