//! Remote server resource implementation

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
use tfkit::validator::{NumberRange, OneOf};

use crate::api::remote_servers::{
    CreateRemoteServerRequest, RemoteServer, UpdateRemoteServerRequest,
};

#[derive(Default)]
pub struct RemoteServerResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl RemoteServerResource {
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

    /// Credentials are write-only and never touched here.
    fn populate_state(state: &mut DynamicValue, server: &RemoteServer) {
        let _ = state.set_i64(&AttributePath::new("id"), server.id);
        let _ = state.set_string(&AttributePath::new("name"), server.name.clone());
        let _ = state.set_string(
            &AttributePath::new("server_type"),
            server.server_type.clone(),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("hostname"),
            server
                .hostname
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
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
            server
                .username
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("max_connections"),
            server
                .max_connections
                .map(|m| Dynamic::Number(m as f64))
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_bool(
            &AttributePath::new("disabled"),
            server.disabled.unwrap_or(false),
        );
    }

    fn extract_create_request(
        planned: &DynamicValue,
    ) -> Result<CreateRemoteServerRequest, Diagnostic> {
        let name = planned.get_string(&AttributePath::new("name")).map_err(|_| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
        })?;
        let server_type = planned
            .get_string(&AttributePath::new("server_type"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing server_type",
                    "The 'server_type' attribute is required",
                )
            })?;

        Ok(CreateRemoteServerRequest {
            name,
            server_type,
            hostname: planned.get_string(&AttributePath::new("hostname")).ok(),
            port: planned.get_i64(&AttributePath::new("port")).ok(),
            username: planned.get_string(&AttributePath::new("username")).ok(),
            password: planned.get_string(&AttributePath::new("password")).ok(),
            private_key: planned.get_string(&AttributePath::new("private_key")).ok(),
            max_connections: planned.get_i64(&AttributePath::new("max_connections")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
        })
    }
}

#[async_trait]
impl Resource for RemoteServerResource {
    fn type_name(&self) -> &str {
        "filehub_remote_server"
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
            .description("Manages a remote server FileHub can push to or pull from")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Remote server ID, assigned by FileHub")
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
                AttributeBuilder::new("server_type", AttributeType::String)
                    .description("Protocol/backend of the remote (sftp, ftp, s3, azure_blob)")
                    .required()
                    .validator(OneOf::new(&["sftp", "ftp", "s3", "azure_blob"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("hostname", AttributeType::String)
                    .description("Server hostname, for sftp/ftp remotes")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("port", AttributeType::Number)
                    .description("Server port")
                    .optional()
                    .validator(NumberRange::between(1.0, 65535.0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("Login user on the remote")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Login password; never returned by the API")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("private_key", AttributeType::String)
                    .description("SSH private key; never returned by the API")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("max_connections", AttributeType::Number)
                    .description("Cap on concurrent connections to the remote")
                    .optional()
                    .validator(NumberRange::at_least(1.0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .description("Stop using this remote without deleting it")
                    .optional()
                    .default(StaticBool::create(false))
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
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        // Host-backed remotes need a hostname.
        if let Ok(server_type) = request
            .config
            .get_string(&AttributePath::new("server_type"))
        {
            let needs_hostname = matches!(server_type.as_str(), "sftp" | "ftp");
            let has_hostname = request
                .config
                .get_string(&AttributePath::new("hostname"))
                .is_ok();
            if needs_hostname && !has_hostname {
                diagnostics.push(Diagnostic::error(
                    "Missing hostname",
                    format!("'hostname' is required for {} remotes", server_type),
                ));
            }
        }

        ValidateResourceConfigResponse { diagnostics }
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

        match provider_data
            .client
            .remote_servers()
            .create(&create_request)
            .await
        {
            Ok(server) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &server);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create remote server",
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

        match provider_data.client.remote_servers().find(id).await {
            Ok(server) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &server);
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
                    "Failed to read remote server",
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
                    "Missing remote server ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let planned = &request.planned_state;
        let update_request = UpdateRemoteServerRequest {
            name: planned.get_string(&AttributePath::new("name")).ok(),
            hostname: planned.get_string(&AttributePath::new("hostname")).ok(),
            port: planned.get_i64(&AttributePath::new("port")).ok(),
            username: planned.get_string(&AttributePath::new("username")).ok(),
            password: planned.get_string(&AttributePath::new("password")).ok(),
            private_key: planned.get_string(&AttributePath::new("private_key")).ok(),
            max_connections: planned.get_i64(&AttributePath::new("max_connections")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
        };

        match provider_data
            .client
            .remote_servers()
            .update(id, &update_request)
            .await
        {
            Ok(server) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &server);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update remote server",
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

        match provider_data.client.remote_servers().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete remote server",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for RemoteServerResource {
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
impl ResourceWithImportState for RemoteServerResource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tfkit::has_errors;

    fn config(server_type: &str, hostname: Option<&str>) -> DynamicValue {
        let mut config = DynamicValue::empty_object();
        config
            .set_string(&AttributePath::new("name"), "backup target".to_string())
            .unwrap();
        config
            .set_string(
                &AttributePath::new("server_type"),
                server_type.to_string(),
            )
            .unwrap();
        if let Some(hostname) = hostname {
            config
                .set_string(&AttributePath::new("hostname"), hostname.to_string())
                .unwrap();
        }
        config
    }

    #[tokio::test]
    async fn sftp_remotes_require_a_hostname() {
        let resource = RemoteServerResource::new();

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "filehub_remote_server".to_string(),
                    config: config("sftp", None),
                },
            )
            .await;
        assert!(has_errors(&response.diagnostics));

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "filehub_remote_server".to_string(),
                    config: config("s3", None),
                },
            )
            .await;
        assert!(!has_errors(&response.diagnostics));
    }
}
