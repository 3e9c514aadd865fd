//! Schema types and builders
//!
//! Resources and data sources describe their configuration surface with a
//! [`Schema`]: named, typed attributes with required/optional/computed flags,
//! plus declarative validators, plan modifiers, and defaults that the
//! planning engine executes.

use crate::types::{AttributePath, Diagnostic, Dynamic};
use std::collections::HashMap;

/// The attribute type system. Must match Terraform's exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    /// Ordered, allows duplicates.
    List(Box<AttributeType>),
    /// Unordered, no duplicates.
    Set(Box<AttributeType>),
    /// String keys only.
    Map(Box<AttributeType>),
    /// Fixed structure.
    Object(HashMap<String, AttributeType>),
    /// Free-form JSON, shape decided at apply time.
    Dynamic,
}

impl AttributeType {
    /// Whether a concrete value inhabits this type. Null and Unknown
    /// inhabit every type; presence is checked separately.
    pub fn conforms(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) | (_, Dynamic::Unknown) => true,
            (AttributeType::Dynamic, _) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items))
            | (AttributeType::Set(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.conforms(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(fields)) => {
                fields.values().all(|v| elem.conforms(v))
            }
            (AttributeType::Object(shape), Dynamic::Map(fields)) => shape
                .iter()
                .all(|(name, ty)| fields.get(name).map(|v| ty.conforms(v)).unwrap_or(true)),
            _ => false,
        }
    }
}

/// Schema for a provider, resource, or data source.
#[derive(Debug)]
pub struct Schema {
    /// Incremented when a change requires state migration.
    pub version: i64,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }
}

/// The root configuration block of a schema.
#[derive(Debug)]
pub struct Block {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

/// A single configuration attribute.
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Box<dyn Validator>>,
    pub plan_modifiers: Vec<Box<dyn PlanModifier>>,
    pub default: Option<Box<dyn Default>>,
}

// Validators and modifiers are trait objects, so Debug is by hand.
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// Validation logic attached to an attribute, run against config values
/// during planning.
pub trait Validator: Send + Sync {
    fn description(&self) -> String;
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

pub struct ValidatorRequest {
    pub config_value: Dynamic,
    pub path: AttributePath,
}

pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrites planned values and flags replacement during planning.
pub trait PlanModifier: Send + Sync {
    fn description(&self) -> String;
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

pub struct PlanModifierRequest {
    pub config_value: Dynamic,
    pub state_value: Dynamic,
    pub plan_value: Dynamic,
    pub path: AttributePath,
}

pub struct PlanModifierResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Supplies a value for an optional attribute absent from configuration.
pub trait Default: Send + Sync {
    fn description(&self) -> String;
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

pub struct DefaultRequest {
    pub path: AttributePath,
}

pub struct DefaultResponse {
    pub value: Dynamic,
}

/// Fluent builder for [`Attribute`]. Always use this rather than
/// constructing the struct directly.
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    pub fn default(mut self, default: Box<dyn Default>) -> Self {
        self.attribute.default = Some(default);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent builder for [`Schema`].
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    description: String::new(),
                    attributes: Vec::new(),
                },
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
    }

    #[test]
    fn schema_builder_collects_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert!(schema.attribute("id").unwrap().computed);
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn type_conformance() {
        let list_of_numbers = AttributeType::List(Box::new(AttributeType::Number));
        assert!(list_of_numbers.conforms(&Dynamic::List(vec![Dynamic::Number(1.0)])));
        assert!(!list_of_numbers.conforms(&Dynamic::List(vec![Dynamic::Bool(true)])));
        assert!(list_of_numbers.conforms(&Dynamic::Null));
        assert!(!list_of_numbers.conforms(&Dynamic::String("nope".to_string())));

        let object = AttributeType::Object(HashMap::from([
            ("email".to_string(), AttributeType::String),
            ("admin".to_string(), AttributeType::Bool),
        ]));
        assert!(object.conforms(&Dynamic::Map(HashMap::from([(
            "email".to_string(),
            Dynamic::String("a@b.c".to_string())
        )]))));
        assert!(!object.conforms(&Dynamic::Map(HashMap::from([(
            "admin".to_string(),
            Dynamic::Number(1.0)
        )]))));

        assert!(AttributeType::Dynamic.conforms(&Dynamic::List(vec![])));
    }
}
