//! Sync resource implementation

use async_trait::async_trait;
use tfkit::context::Context;
use tfkit::defaults::StaticBool;
use tfkit::import::import_numeric_id;
use tfkit::plan_modifier::UseStateForUnknown;
use tfkit::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfkit::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfkit::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfkit::validator::OneOf;

use crate::api::syncs::{CreateSyncRequest, Sync, UpdateSyncRequest};

#[derive(Default)]
pub struct SyncResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl SyncResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&crate::FileHubProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }

    fn populate_state(state: &mut DynamicValue, sync: &Sync) {
        let _ = state.set_i64(&AttributePath::new("id"), sync.id);
        let _ = state.set_string(&AttributePath::new("name"), sync.name.clone());
        let _ = state.set_string(&AttributePath::new("sync_type"), sync.sync_type.clone());
        let _ = state.set_dynamic(
            &AttributePath::new("src_path"),
            sync.src_path
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("dest_path"),
            sync.dest_path
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("remote_server_id"),
            sync.remote_server_id
                .map(|id| Dynamic::Number(id as f64))
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("interval"),
            sync.interval
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_bool(
            &AttributePath::new("disabled"),
            sync.disabled.unwrap_or(false),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("last_synced_at"),
            sync.last_synced_at
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
    }

    fn extract_create_request(planned: &DynamicValue) -> Result<CreateSyncRequest, Diagnostic> {
        let name = planned.get_string(&AttributePath::new("name")).map_err(|_| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
        })?;
        let sync_type = planned
            .get_string(&AttributePath::new("sync_type"))
            .map_err(|_| {
                Diagnostic::error("Missing sync_type", "The 'sync_type' attribute is required")
            })?;

        Ok(CreateSyncRequest {
            name,
            sync_type,
            src_path: planned.get_string(&AttributePath::new("src_path")).ok(),
            dest_path: planned.get_string(&AttributePath::new("dest_path")).ok(),
            remote_server_id: planned
                .get_i64(&AttributePath::new("remote_server_id"))
                .ok(),
            interval: planned.get_string(&AttributePath::new("interval")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
        })
    }
}

#[async_trait]
impl Resource for SyncResource {
    fn type_name(&self) -> &str {
        "filehub_sync"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages a sync between FileHub and a remote server")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Sync ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Display name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sync_type", AttributeType::String)
                    .description("Direction of the sync")
                    .required()
                    .validator(OneOf::new(&["push", "pull", "two_way"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("src_path", AttributeType::String)
                    .description("Source folder")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dest_path", AttributeType::String)
                    .description("Destination folder")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("remote_server_id", AttributeType::Number)
                    .description("Remote server the sync talks to")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("interval", AttributeType::String)
                    .description("Run cadence")
                    .optional()
                    .validator(OneOf::new(&["hourly", "daily", "weekly"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .description("Pause the sync")
                    .optional()
                    .default(StaticBool::create(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_synced_at", AttributeType::String)
                    .description("Timestamp of the most recent completed run")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let create_request = match Self::extract_create_request(&request.planned_state) {
            Ok(create_request) => create_request,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        match provider_data.client.syncs().create(&create_request).await {
            Ok(sync) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &sync);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create sync",
                    format!("API error: {}", e),
                ));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let id = match request.current_state.get_i64(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
        };

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        match provider_data.client.syncs().find(id).await {
            Ok(sync) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &sync);
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read sync",
                    format!("API error: {}", e),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let id = match request.prior_state.get_i64(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Missing sync ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let planned = &request.planned_state;
        let update_request = UpdateSyncRequest {
            name: planned.get_string(&AttributePath::new("name")).ok(),
            src_path: planned.get_string(&AttributePath::new("src_path")).ok(),
            dest_path: planned.get_string(&AttributePath::new("dest_path")).ok(),
            remote_server_id: planned
                .get_i64(&AttributePath::new("remote_server_id"))
                .ok(),
            interval: planned.get_string(&AttributePath::new("interval")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
        };

        match provider_data.client.syncs().update(id, &update_request).await {
            Ok(sync) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &sync);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update sync",
                    format!("API error: {}", e),
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let id = match request.prior_state.get_i64(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => {
                return DeleteResourceResponse { diagnostics };
            }
        };

        match provider_data.client.syncs().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete sync",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for SyncResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
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

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithImportState for SyncResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_numeric_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
