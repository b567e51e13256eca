//! Broker Daemon library
//!
//! This crate provides the REST transport over the lifecycle control plane:
//! - Protocol route handlers and version precondition
//! - Configuration (including the catalog definition)
//! - Server lifecycle management

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::{create_router, AppState};
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
