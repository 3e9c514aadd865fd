//! Sync data source implementation

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
pub struct SyncDataSource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl SyncDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for SyncDataSource {
    fn type_name(&self) -> &str {
        "filehub_sync"
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
            .description("Looks up a FileHub sync by ID")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Sync ID to look up")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sync_type", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("src_path", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dest_path", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("remote_server_id", AttributeType::Number)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("interval", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_synced_at", AttributeType::String)
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

        match provider_data.client.syncs().find(id).await {
            Ok(sync) => {
                let mut state = DynamicValue::empty_object();
                let _ = state.set_i64(&AttributePath::new("id"), sync.id);
                let _ = state.set_string(&AttributePath::new("name"), sync.name);
                let _ = state.set_string(&AttributePath::new("sync_type"), sync.sync_type);
                let _ = state.set_dynamic(
                    &AttributePath::new("src_path"),
                    sync.src_path.map(Dynamic::String).unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("dest_path"),
                    sync.dest_path.map(Dynamic::String).unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("remote_server_id"),
                    sync.remote_server_id
                        .map(|id| Dynamic::Number(id as f64))
                        .unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("interval"),
                    sync.interval.map(Dynamic::String).unwrap_or(Dynamic::Null),
                );
                let _ = state.set_bool(
                    &AttributePath::new("disabled"),
                    sync.disabled.unwrap_or(false),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("last_synced_at"),
                    sync.last_synced_at
                        .map(Dynamic::String)
                        .unwrap_or(Dynamic::Null),
                );

                ReadDataSourceResponse {
                    state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read sync",
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
impl DataSourceWithConfigure for SyncDataSource {
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
