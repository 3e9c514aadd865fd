//! Config validation and plan assembly
//!
//! The host orchestrator diffs desired configuration against prior state.
//! This module is the provider-side half of that contract: it checks a
//! configuration against a schema, then assembles the planned state:
//! filling defaults, marking computed attributes unknown, and running each
//! attribute's plan modifiers so replace-on-change markers take effect.

use crate::schema::{DefaultRequest, PlanModifierRequest, Schema, ValidatorRequest};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// Outcome of planning one resource change.
#[derive(Debug)]
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Check a configuration against a schema: required attributes present,
/// supplied values type-conformant, declared validators satisfied.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // A null config is a destroy; nothing to check.
    if config.is_null() {
        return diagnostics;
    }

    let values = match &config.value {
        Dynamic::Map(fields) => fields.clone(),
        other => {
            diagnostics.push(Diagnostic::error(
                "Invalid configuration",
                format!("expected an object, got {}", other.type_name()),
            ));
            return diagnostics;
        }
    };

    for name in values.keys() {
        if schema.attribute(name).is_none() {
            diagnostics.push(Diagnostic::error(
                format!("Unexpected attribute '{}'", name),
                "this attribute is not declared in the schema",
            ));
        }
    }

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let value = values.get(&attr.name).cloned().unwrap_or(Dynamic::Null);

        if attr.required && matches!(value, Dynamic::Null) {
            diagnostics.push(
                Diagnostic::error(
                    format!("Missing required attribute '{}'", attr.name),
                    format!("'{}' must be set", attr.name),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        if !attr.r#type.conforms(&value) {
            diagnostics.push(
                Diagnostic::error(
                    format!("Invalid type for '{}'", attr.name),
                    format!("got {}", value.type_name()),
                )
                .with_attribute(path.clone()),
            );
            continue;
        }

        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: value.clone(),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    diagnostics
}

/// Assemble the planned state for a resource change.
///
/// Config values win; null optionals take their declared default; computed
/// attributes absent from config become unknown. Plan modifiers then run per
/// attribute in declaration order, each seeing the previous one's output.
/// A null config with existing prior state is a destroy plan.
pub fn plan_resource_change(
    schema: &Schema,
    config: &DynamicValue,
    prior_state: &DynamicValue,
) -> PlannedChange {
    let mut diagnostics = Vec::new();
    let mut requires_replace = Vec::new();

    if config.is_null() {
        return PlannedChange {
            planned_state: DynamicValue::null(),
            requires_replace,
            diagnostics,
        };
    }

    let config_values = match &config.value {
        Dynamic::Map(fields) => fields.clone(),
        _ => HashMap::new(),
    };
    let prior_values = match &prior_state.value {
        Dynamic::Map(fields) => fields.clone(),
        _ => HashMap::new(),
    };

    let mut planned = HashMap::with_capacity(schema.block.attributes.len());

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let config_value = config_values.get(&attr.name).cloned().unwrap_or(Dynamic::Null);
        let state_value = prior_values.get(&attr.name).cloned().unwrap_or(Dynamic::Null);

        let mut plan_value = if !matches!(config_value, Dynamic::Null) {
            config_value.clone()
        } else if let Some(default) = &attr.default {
            default
                .default_value(DefaultRequest { path: path.clone() })
                .value
        } else if attr.computed {
            Dynamic::Unknown
        } else {
            Dynamic::Null
        };

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: config_value.clone(),
                state_value: state_value.clone(),
                plan_value,
                path: path.clone(),
            });
            plan_value = response.plan_value;
            diagnostics.extend(response.diagnostics);
            if response.requires_replace {
                tracing::debug!(attribute = %path, "plan requires replacement");
                requires_replace.push(path.clone());
            }
        }

        planned.insert(attr.name.clone(), plan_value);
    }

    PlannedChange {
        planned_state: DynamicValue::new(Dynamic::Map(planned)),
        requires_replace,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::StaticString;
    use crate::plan_modifier::{RequiresReplace, UseStateForUnknown};
    use crate::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
    use crate::types::has_errors;
    use crate::validator::OneOf;

    fn test_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("station_id", AttributeType::Number)
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("level", AttributeType::String)
                    .optional()
                    .validator(OneOf::new(&["none", "weak", "strict"]))
                    .default(StaticString::create("none"))
                    .build(),
            )
            .build()
    }

    fn config(pairs: &[(&str, Dynamic)]) -> DynamicValue {
        let mut dv = DynamicValue::empty_object();
        for (name, value) in pairs {
            dv.set_dynamic(&AttributePath::new(name), value.clone())
                .unwrap();
        }
        dv
    }

    #[test]
    fn validate_flags_missing_required() {
        let diags = validate_config(&test_schema(), &config(&[]));
        assert!(has_errors(&diags));
        assert!(diags
            .iter()
            .any(|d| d.summary.contains("Missing required attribute 'name'")));
    }

    #[test]
    fn validate_flags_type_mismatch_and_bad_enum() {
        let cfg = config(&[
            ("name", Dynamic::Bool(true)),
            ("station_id", Dynamic::Number(1.0)),
            ("level", Dynamic::String("loud".to_string())),
        ]);
        let diags = validate_config(&test_schema(), &cfg);
        assert!(diags.iter().any(|d| d.summary.contains("Invalid type for 'name'")));
        assert!(diags.iter().any(|d| d.detail.contains("loud")));
    }

    #[test]
    fn validate_flags_undeclared_attribute() {
        let cfg = config(&[
            ("name", Dynamic::String("a".to_string())),
            ("station_id", Dynamic::Number(1.0)),
            ("typo", Dynamic::Bool(true)),
        ]);
        let diags = validate_config(&test_schema(), &cfg);
        assert!(diags.iter().any(|d| d.summary.contains("typo")));
    }

    #[test]
    fn create_plan_fills_defaults_and_marks_computed_unknown() {
        let cfg = config(&[
            ("name", Dynamic::String("partner".to_string())),
            ("station_id", Dynamic::Number(7.0)),
        ]);

        let change = plan_resource_change(&test_schema(), &cfg, &DynamicValue::null());

        assert!(change.requires_replace.is_empty());
        let planned = change.planned_state;
        assert_eq!(
            planned.get_dynamic(&AttributePath::new("id")).unwrap(),
            Dynamic::Unknown
        );
        assert_eq!(
            planned.get_string(&AttributePath::new("level")).unwrap(),
            "none"
        );
    }

    #[test]
    fn update_plan_keeps_known_id_and_flags_replacement() {
        let cfg = config(&[
            ("name", Dynamic::String("partner".to_string())),
            ("station_id", Dynamic::Number(8.0)),
        ]);
        let mut prior = DynamicValue::empty_object();
        prior.set_i64(&AttributePath::new("id"), 42).unwrap();
        prior
            .set_string(&AttributePath::new("name"), "partner".to_string())
            .unwrap();
        prior.set_i64(&AttributePath::new("station_id"), 7).unwrap();
        prior
            .set_string(&AttributePath::new("level"), "none".to_string())
            .unwrap();

        let change = plan_resource_change(&test_schema(), &cfg, &prior);

        // UseStateForUnknown restores the identifier.
        assert_eq!(
            change
                .planned_state
                .get_i64(&AttributePath::new("id"))
                .unwrap(),
            42
        );
        // station_id changed 7 -> 8 under RequiresReplace.
        assert_eq!(change.requires_replace, vec![AttributePath::new("station_id")]);
    }

    #[test]
    fn null_config_is_a_destroy_plan() {
        let mut prior = DynamicValue::empty_object();
        prior.set_i64(&AttributePath::new("id"), 42).unwrap();

        let change = plan_resource_change(&test_schema(), &DynamicValue::null(), &prior);
        assert!(change.planned_state.is_null());
    }
}
