//! Plan-parameter validation
//!
//! A plan without a schema accepts anything, including no parameters at all.
//! A plan with a schema is strict: every declared constraint must hold and
//! fields the schema does not declare are rejected. A request that omits the
//! parameter object entirely, against a plan that requires at least one
//! field, fails with a reason distinct from ordinary constraint violations;
//! both surface to the caller as the same bad-request category.

use broker_types::{ParameterSchema, Parameters, Plan};
use thiserror::Error;

/// Why a parameter object was rejected
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParameterFault {
    /// The plan requires parameters and none were supplied
    #[error("missing parameters: plan '{plan}' declares required fields")]
    Missing { plan: String },

    /// The supplied object violates the plan's declared constraints
    #[error("invalid parameters: {reason}")]
    Invalid { reason: String },
}

impl ParameterFault {
    fn invalid(reason: impl Into<String>) -> Self {
        ParameterFault::Invalid {
            reason: reason.into(),
        }
    }
}

/// Validate a caller-supplied parameter object against a plan's contract
pub fn validate_parameters(
    plan: &Plan,
    parameters: Option<&Parameters>,
) -> Result<(), ParameterFault> {
    let Some(schema) = &plan.schema else {
        return Ok(());
    };

    let empty = Parameters::new();
    let parameters = match parameters {
        Some(parameters) => parameters,
        // An absent object is only acceptable when nothing is required.
        None if schema.has_required_fields() => {
            return Err(ParameterFault::Missing {
                plan: plan.name.clone(),
            });
        }
        None => &empty,
    };

    check_fields(schema, parameters)
}

fn check_fields(schema: &ParameterSchema, parameters: &Parameters) -> Result<(), ParameterFault> {
    for name in parameters.keys() {
        if !schema.fields.contains_key(name) {
            return Err(ParameterFault::invalid(format!(
                "field '{name}' is not declared by the plan"
            )));
        }
    }

    for (name, spec) in &schema.fields {
        let Some(value) = parameters.get(name) else {
            if spec.required {
                return Err(ParameterFault::invalid(format!(
                    "required field '{name}' is missing"
                )));
            }
            continue;
        };

        if value.is_object() || value.is_array() {
            return Err(ParameterFault::invalid(format!(
                "field '{name}' must be a scalar value"
            )));
        }

        if !spec.field_type.admits(value) {
            return Err(ParameterFault::invalid(format!(
                "field '{name}' has the wrong type"
            )));
        }

        if let Some(allowed) = &spec.allowed {
            if !allowed.contains(value) {
                return Err(ParameterFault::invalid(format!(
                    "field '{name}' is not one of the allowed values"
                )));
            }
        }
    }

    Ok(())
}
