//! Terraform provider for the FileHub file-management platform.
//!
//! The provider block takes an endpoint and an API key, builds one shared
//! [`api::Client`], and hands it to every resource and data source through
//! their configure hooks.

pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::FileHubProviderData;

use async_trait::async_trait;
use std::sync::Arc;
use tfkit::context::Context;
use tfkit::data_source::DataSourceWithConfigure;
use tfkit::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderSchemaRequest,
    ProviderSchemaResponse,
};
use tfkit::resource::ResourceWithConfigure;
use tfkit::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfkit::types::{AttributePath, Diagnostic};
use tfkit::TfkitError;

const ENDPOINT_ENV: &str = "FILEHUB_ENDPOINT";
const API_KEY_ENV: &str = "FILEHUB_API_KEY";

#[derive(Default)]
pub struct FileHubProvider {
    data: Option<FileHubProviderData>,
}

impl FileHubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_endpoint(endpoint: &str) -> Result<(), Diagnostic> {
        let parsed = url::Url::parse(endpoint).map_err(|e| {
            Diagnostic::error("Invalid endpoint", format!("'{}' is not a URL: {}", endpoint, e))
                .with_attribute(AttributePath::new("endpoint"))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Diagnostic::error(
                "Invalid endpoint",
                format!("endpoint must be http or https, got '{}'", other),
            )
            .with_attribute(AttributePath::new("endpoint"))),
        }
    }
}

#[async_trait]
impl Provider for FileHubProvider {
    fn type_name(&self) -> &str {
        "filehub"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("FileHub provider configuration")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Base URL of the FileHub API; FILEHUB_ENDPOINT is the fallback")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .description("API key used for every request; FILEHUB_API_KEY is the fallback")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let endpoint = request
            .config
            .get_string(&AttributePath::new("endpoint"))
            .ok()
            .or_else(|| std::env::var(ENDPOINT_ENV).ok());
        let api_key = request
            .config
            .get_string(&AttributePath::new("api_key"))
            .ok()
            .or_else(|| std::env::var(API_KEY_ENV).ok());

        let (endpoint, api_key) = match (endpoint, api_key) {
            (Some(endpoint), Some(api_key)) => (endpoint, api_key),
            (None, _) => {
                diagnostics.push(Diagnostic::error(
                    "Missing endpoint",
                    format!(
                        "endpoint is required (set it in the provider block or via {})",
                        ENDPOINT_ENV
                    ),
                ));
                return ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics,
                };
            }
            (_, None) => {
                diagnostics.push(Diagnostic::error(
                    "Missing API key",
                    format!(
                        "api_key is required (set it in the provider block or via {})",
                        API_KEY_ENV
                    ),
                ));
                return ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics,
                };
            }
        };

        if let Err(diag) = Self::validate_endpoint(&endpoint) {
            diagnostics.push(diag);
            return ConfigureProviderResponse {
                provider_data: None,
                diagnostics,
            };
        }

        match api::Client::new(&endpoint, &api_key) {
            Ok(client) => {
                tracing::debug!("configured FileHub client for {}", endpoint);
                let data = FileHubProviderData::new(client);
                self.data = Some(data.clone());
                ConfigureProviderResponse {
                    provider_data: Some(Arc::new(data)),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    provider_data: None,
                    diagnostics,
                }
            }
        }
    }

    async fn create_resource(
        &self,
        type_name: &str,
    ) -> tfkit::Result<Box<dyn ResourceWithConfigure>> {
        match type_name {
            "filehub_user" => Ok(Box::new(resources::UserResource::new())),
            "filehub_group" => Ok(Box::new(resources::GroupResource::new())),
            "filehub_group_user" => Ok(Box::new(resources::GroupUserResource::new())),
            "filehub_remote_server" => Ok(Box::new(resources::RemoteServerResource::new())),
            "filehub_automation" => Ok(Box::new(resources::AutomationResource::new())),
            "filehub_behavior" => Ok(Box::new(resources::BehaviorResource::new())),
            "filehub_sync" => Ok(Box::new(resources::SyncResource::new())),
            "filehub_as2_station" => Ok(Box::new(resources::As2StationResource::new())),
            "filehub_as2_partner" => Ok(Box::new(resources::As2PartnerResource::new())),
            "filehub_share_group" => Ok(Box::new(resources::ShareGroupResource::new())),
            other => Err(TfkitError::ResourceNotFound(other.to_string())),
        }
    }

    async fn create_data_source(
        &self,
        type_name: &str,
    ) -> tfkit::Result<Box<dyn DataSourceWithConfigure>> {
        match type_name {
            "filehub_user" => Ok(Box::new(data_sources::UserDataSource::new())),
            "filehub_group" => Ok(Box::new(data_sources::GroupDataSource::new())),
            "filehub_remote_server" => Ok(Box::new(data_sources::RemoteServerDataSource::new())),
            "filehub_automation" => Ok(Box::new(data_sources::AutomationDataSource::new())),
            "filehub_behavior" => Ok(Box::new(data_sources::BehaviorDataSource::new())),
            "filehub_sync" => Ok(Box::new(data_sources::SyncDataSource::new())),
            other => Err(TfkitError::DataSourceNotFound(other.to_string())),
        }
    }

    fn resource_names(&self) -> Vec<String> {
        [
            "filehub_user",
            "filehub_group",
            "filehub_group_user",
            "filehub_remote_server",
            "filehub_automation",
            "filehub_behavior",
            "filehub_sync",
            "filehub_as2_station",
            "filehub_as2_partner",
            "filehub_share_group",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn data_source_names(&self) -> Vec<String> {
        [
            "filehub_user",
            "filehub_group",
            "filehub_remote_server",
            "filehub_automation",
            "filehub_behavior",
            "filehub_sync",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfkit::types::DynamicValue;

    fn config_with(endpoint: Option<&str>, api_key: Option<&str>) -> DynamicValue {
        let mut config = DynamicValue::empty_object();
        if let Some(endpoint) = endpoint {
            config
                .set_string(&AttributePath::new("endpoint"), endpoint.to_string())
                .unwrap();
        }
        if let Some(api_key) = api_key {
            config
                .set_string(&AttributePath::new("api_key"), api_key.to_string())
                .unwrap();
        }
        config
    }

    #[tokio::test]
    #[serial]
    async fn configure_succeeds_with_explicit_config() {
        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(API_KEY_ENV);

        let mut provider = FileHubProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: config_with(Some("https://app.filehub.example"), Some("key-123")),
                },
            )
            .await;

        assert!(!tfkit::has_errors(&response.diagnostics));
        assert!(response.provider_data.is_some());
        assert!(provider.data.is_some());
    }

    #[tokio::test]
    #[serial]
    async fn configure_falls_back_to_env_vars() {
        std::env::set_var(ENDPOINT_ENV, "https://app.filehub.example");
        std::env::set_var(API_KEY_ENV, "env-key");

        let mut provider = FileHubProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: DynamicValue::empty_object(),
                },
            )
            .await;

        assert!(!tfkit::has_errors(&response.diagnostics));

        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(API_KEY_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn configure_requires_endpoint() {
        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(API_KEY_ENV);

        let mut provider = FileHubProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: config_with(None, Some("key-123")),
                },
            )
            .await;

        assert!(tfkit::has_errors(&response.diagnostics));
        assert!(response.diagnostics[0].summary.contains("endpoint"));
    }

    #[tokio::test]
    #[serial]
    async fn configure_requires_api_key() {
        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(API_KEY_ENV);

        let mut provider = FileHubProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: config_with(Some("https://app.filehub.example"), None),
                },
            )
            .await;

        assert!(tfkit::has_errors(&response.diagnostics));
        assert!(response.diagnostics[0].summary.contains("API key"));
    }

    #[tokio::test]
    #[serial]
    async fn configure_rejects_non_http_endpoints() {
        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(API_KEY_ENV);

        let mut provider = FileHubProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: config_with(Some("ftp://app.filehub.example"), Some("key-123")),
                },
            )
            .await;

        assert!(tfkit::has_errors(&response.diagnostics));
        assert!(response.diagnostics[0].detail.contains("http"));
    }

    #[tokio::test]
    async fn factories_cover_every_advertised_type_name() {
        let provider = FileHubProvider::new();

        for name in provider.resource_names() {
            assert!(provider.create_resource(&name).await.is_ok(), "{}", name);
        }
        for name in provider.data_source_names() {
            assert!(provider.create_data_source(&name).await.is_ok(), "{}", name);
        }

        assert!(provider.create_resource("filehub_bogus").await.is_err());
        assert!(provider.create_data_source("filehub_bogus").await.is_err());
    }

    #[tokio::test]
    async fn provider_schema_marks_api_key_sensitive() {
        let provider = FileHubProvider::new();
        let schema = provider
            .schema(Context::new(), ProviderSchemaRequest)
            .await
            .schema;

        assert!(schema.attribute("api_key").unwrap().sensitive);
        assert!(!schema.attribute("endpoint").unwrap().sensitive);
    }
}
