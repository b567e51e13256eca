//! Catalog data model
//!
//! Services and plans are created once, when the catalog definition is
//! loaded at startup, and never mutated afterwards. A plan may carry a
//! parameter schema: a flat rule set mapping field names to type and
//! required/allowed constraints, evaluated generically by the validator.

use crate::ids::{PlanId, ServiceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A catalog offering with its purchasable plans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Service identifier, unique within the catalog
    pub id: ServiceId,

    /// Human-readable service name
    pub name: String,

    /// Short description shown to the platform
    pub description: String,

    /// Classification tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether instances of this service accept bindings
    pub bindable: bool,

    /// Whether an instance may move to a different plan after creation
    pub plan_updateable: bool,

    /// Ordered plans, as declared in the catalog definition
    pub plans: Vec<Plan>,
}

impl Service {
    /// Look up a plan of this service by id
    pub fn find_plan(&self, plan_id: &PlanId) -> Option<&Plan> {
        self.plans.iter().find(|plan| &plan.id == plan_id)
    }
}

/// A purchasable variant of a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier, unique within the catalog
    pub id: PlanId,

    /// Owning service
    pub service_id: ServiceId,

    /// Human-readable plan name
    pub name: String,

    /// Short description shown to the platform
    pub description: String,

    /// Whether the plan is free of charge
    pub free: bool,

    /// Optional parameter contract for provision/update/bind requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ParameterSchema>,
}

/// Per-plan validation rule set
///
/// Deliberately small: a flat map of field name to constraint. Plans that
/// need a new field add an entry here instead of code anywhere else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Declared fields, ordered by name
    pub fields: BTreeMap<String, FieldSpec>,
}

impl ParameterSchema {
    /// Whether at least one declared field is required
    pub fn has_required_fields(&self) -> bool {
        self.fields.values().any(|spec| spec.required)
    }
}

/// Constraint for a single declared parameter field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Expected JSON type of the field value
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the field must be present
    #[serde(default)]
    pub required: bool,

    /// Optional closed set of accepted values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

/// JSON types a parameter field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    /// Whether the given JSON value satisfies this type
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}
