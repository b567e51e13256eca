//! Broker Catalog - offerings registry and parameter validation
//!
//! The catalog is a plain immutable value built once at startup and shared
//! behind an `Arc`: reads never take a lock and never block. Tests construct
//! alternate catalogs directly instead of reconfiguring a process-wide
//! singleton.
//!
//! Parameter validation is the other half of this crate: a caller-supplied
//! parameter object is checked against the rule set a plan declares, in
//! strict mode (undeclared fields are rejected).

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod params;
pub mod registry;

pub use params::{validate_parameters, ParameterFault};
pub use registry::Catalog;
