//! Provider trait: configuration plus resource/data-source factories
//!
//! Providers are factories. After `configure` succeeds, the host asks for
//! fresh resource/data-source instances by type name and hands each one the
//! provider data returned from `configure`.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::error::Result;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Constant provider name, e.g. `"filehub"`.
    fn type_name(&self) -> &str;

    /// Schema of the provider's own configuration block.
    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Validate credentials/endpoint and build the shared client.
    ///
    /// `provider_data` from the response is delivered verbatim to every
    /// resource and data source configure hook.
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Instantiate a resource by type name.
    async fn create_resource(&self, type_name: &str) -> Result<Box<dyn ResourceWithConfigure>>;

    /// Instantiate a data source by type name.
    async fn create_data_source(&self, type_name: &str)
        -> Result<Box<dyn DataSourceWithConfigure>>;

    /// Type names answered by `create_resource`.
    fn resource_names(&self) -> Vec<String>;

    /// Type names answered by `create_data_source`.
    fn data_source_names(&self) -> Vec<String>;
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
    pub diagnostics: Vec<Diagnostic>,
}
