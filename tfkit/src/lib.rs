//! tfkit - Terraform provider toolkit for Rust
//!
//! Building blocks for writing Terraform providers: the dynamic value
//! system, schema declarations with validators/plan modifiers/defaults, the
//! plan assembly engine, and the async provider/resource/data-source trait
//! surface.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod plan;
pub mod plan_modifier;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfkitError};
pub use import::{import_numeric_id, import_state_passthrough_id, split_composite_id};
pub use plan::{plan_resource_change, validate_config, PlannedChange};
pub use provider::{ConfigureProviderRequest, ConfigureProviderResponse, Provider};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{
    has_errors, AttributePath, Config, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue,
    State,
};
