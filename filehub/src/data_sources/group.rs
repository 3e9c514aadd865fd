//! Group data source implementation

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
pub struct GroupDataSource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl GroupDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for GroupDataSource {
    fn type_name(&self) -> &str {
        "filehub_group"
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
            .description("Looks up a FileHub group by ID")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Group ID to look up")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("notes", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "user_ids",
                    AttributeType::List(Box::new(AttributeType::Number)),
                )
                .computed()
                .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "admin_ids",
                    AttributeType::List(Box::new(AttributeType::Number)),
                )
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

        match provider_data.client.groups().find(id).await {
            Ok(group) => {
                let mut state = DynamicValue::empty_object();
                let _ = state.set_i64(&AttributePath::new("id"), group.id);
                let _ = state.set_string(&AttributePath::new("name"), group.name);
                let _ = state.set_dynamic(
                    &AttributePath::new("notes"),
                    group.notes.map(Dynamic::String).unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("user_ids"),
                    group
                        .user_ids
                        .as_deref()
                        .map(crate::resources::ids_to_dynamic)
                        .unwrap_or(Dynamic::Null),
                );
                let _ = state.set_dynamic(
                    &AttributePath::new("admin_ids"),
                    group
                        .admin_ids
                        .as_deref()
                        .map(crate::resources::ids_to_dynamic)
                        .unwrap_or(Dynamic::Null),
                );

                ReadDataSourceResponse {
                    state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read group",
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
impl DataSourceWithConfigure for GroupDataSource {
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
