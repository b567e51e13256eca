//! Broker Control - the lifecycle orchestration facade
//!
//! A thin coordination layer: decoded protocol requests come in, the
//! catalog and ledgers do the work, outcomes go back out. The facade owns
//! no records and takes no locks of its own; it exists so the transport
//! layer talks to exactly one object and so every lifecycle transition is
//! logged in one place.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod control_plane;

pub use control_plane::BrokerControlPlane;
