//! Configuration for broker-daemon
//!
//! The catalog definition lives in configuration: the daemon turns it into
//! the immutable `Catalog` value once at startup. Everything can come from
//! a config file, `BROKER_*` environment variables, or CLI overrides.

use broker_catalog::Catalog;
use broker_types::{FieldSpec, FieldType, ParameterSchema, Plan, PlanId, Service, ServiceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog definition, turned into the immutable registry at startup
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl DaemonConfig {
    /// Load configuration from an optional file layered with `BROKER_*`
    /// environment variables (e.g. `BROKER_SERVER__LISTEN_ADDR`)
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder
            .add_source(config::Environment::with_prefix("BROKER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".parse().expect("static default address"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level filter
    pub level: String,

    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Catalog definition as it appears in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub services: Vec<ServiceDef>,
}

/// A service entry in the catalog definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDef {
    /// Stable id; generated per process start when absent
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_true")]
    pub bindable: bool,

    #[serde(default = "default_true")]
    pub plan_updateable: bool,

    pub plans: Vec<PlanDef>,
}

/// A plan entry in the catalog definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDef {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,
    pub description: String,

    #[serde(default = "default_true")]
    pub free: bool,

    /// Field constraints; absence means the plan takes any parameters
    #[serde(default)]
    pub schema: Option<BTreeMap<String, FieldSpec>>,
}

fn default_true() -> bool {
    true
}

impl CatalogConfig {
    /// Build the immutable catalog value, minting ids where none are pinned
    pub fn build(&self) -> Catalog {
        let services = self
            .services
            .iter()
            .map(|service_def| {
                let service_id = service_def
                    .id
                    .as_deref()
                    .map(ServiceId::new)
                    .unwrap_or_else(ServiceId::generate);

                let plans = service_def
                    .plans
                    .iter()
                    .map(|plan_def| Plan {
                        id: plan_def
                            .id
                            .as_deref()
                            .map(PlanId::new)
                            .unwrap_or_else(PlanId::generate),
                        service_id: service_id.clone(),
                        name: plan_def.name.clone(),
                        description: plan_def.description.clone(),
                        free: plan_def.free,
                        schema: plan_def.schema.clone().map(|fields| ParameterSchema { fields }),
                    })
                    .collect();

                Service {
                    id: service_id,
                    name: service_def.name.clone(),
                    description: service_def.description.clone(),
                    tags: service_def.tags.clone(),
                    bindable: service_def.bindable,
                    plan_updateable: service_def.plan_updateable,
                    plans,
                }
            })
            .collect();

        Catalog::new(services)
    }
}

impl Default for CatalogConfig {
    /// The demonstration catalog: one service, a schemaless "simple" plan
    /// and a "complex" plan requiring an instance name
    fn default() -> Self {
        let mut complex_fields = BTreeMap::new();
        complex_fields.insert(
            "name".to_string(),
            FieldSpec {
                field_type: FieldType::String,
                required: true,
                allowed: None,
            },
        );

        Self {
            services: vec![ServiceDef {
                id: None,
                name: "demo-service".to_string(),
                description: "Demonstration service managed by this broker".to_string(),
                tags: vec!["demo".to_string()],
                bindable: true,
                plan_updateable: true,
                plans: vec![
                    PlanDef {
                        id: None,
                        name: "simple".to_string(),
                        description: "No configuration required".to_string(),
                        free: true,
                        schema: None,
                    },
                    PlanDef {
                        id: None,
                        name: "complex".to_string(),
                        description: "Requires an instance name".to_string(),
                        free: true,
                        schema: Some(complex_fields),
                    },
                ],
            }],
        }
    }
}
