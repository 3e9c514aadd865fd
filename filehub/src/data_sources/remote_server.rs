//! Remote server data source implementation
//!
//! Credentials never come back from the API, so the data source exposes
//! only the connection settings.

use async_trait::async_trait;
use tfkit::context::Context;
use tfkit::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceMetadataRequest, DataSourceMetadataResponse, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfkit::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfkit::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

#[derive(Default)]
pub struct RemoteServerDataSource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl RemoteServerDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for RemoteServerDataSource {
    fn type_name(&self) -> &str {
        "filehub_remote_server"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Looks up a FileHub remote server by ID")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Remote server ID to look up")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("server_type", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("hostname", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("port", AttributeType::Number)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("max_connections", AttributeType::Number)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let id = match request.config.get_i64(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Missing id",
                    format!("The 'id' attribute is required: {}", e),
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        match provider_data.client.remote_servers().find(id).await {
            Ok(server) => {
                let mut state = DynamicValue::empty_object();
                let _ = state.set_i64(&AttributePath::new("id"), server.id);
                let _ = state.set_string(&AttributePath::new("name"), server.name);
                let _ = state.set_string(&AttributePath::new("server_type"), server.server_type);
                let _ = state.set_dynamic(
                    &AttributePath::new("hostname"),
                    server.hostname.map(Dynamic::String).unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("port"),
                    server
                        .port
                        .map(|p| Dynamic::Number(p as f64))
                        .unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("username"),
                    server.username.map(Dynamic::String).unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("max_connections"),
                    server
                        .max_connections
                        .map(|n| Dynamic::Number(n as f64))
                        .unwrap_or(Dynamic::Null),
                );
                let _ = state.set_bool(
                    &AttributePath::new("disabled"),
                    server.disabled.unwrap_or(false),
                );

                ReadDataSourceResponse {
                    state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read remote server",
                    format!("API error: {}", e),
                ));
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for RemoteServerDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        match request
            .provider_data
            .as_ref()
            .and_then(|data| data.downcast_ref::<crate::FileHubProviderData>())
        {
            Some(provider_data) => self.provider_data = Some(provider_data.clone()),
            None => diagnostics.push(Diagnostic::error(
                "Invalid provider data",
                "Failed to extract FileHubProviderData from provider data",
            )),
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
