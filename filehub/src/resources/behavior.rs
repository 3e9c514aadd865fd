//! Behavior resource implementation
//!
//! Attaches a behavior to a folder path. The folder and the behavior kind
//! are fixed at creation; `value` is free-form JSON.

use async_trait::async_trait;
use tfkit::context::Context;
use tfkit::defaults::StaticBool;
use tfkit::import::import_numeric_id;
use tfkit::plan_modifier::{RequiresReplace, UseStateForUnknown};
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

use crate::api::behaviors::{Behavior, CreateBehaviorRequest, UpdateBehaviorRequest};

#[derive(Default)]
pub struct BehaviorResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl BehaviorResource {
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

    fn populate_state(state: &mut DynamicValue, behavior: &Behavior) {
        let _ = state.set_i64(&AttributePath::new("id"), behavior.id);
        let _ = state.set_string(&AttributePath::new("path"), behavior.path.clone());
        let _ = state.set_string(&AttributePath::new("behavior"), behavior.behavior.clone());
        let _ = state.set_dynamic(
            &AttributePath::new("value"),
            behavior
                .value
                .as_ref()
                .map(Dynamic::from_json)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_bool(
            &AttributePath::new("disabled"),
            behavior.disabled.unwrap_or(false),
        );
    }

    fn extract_value(planned: &DynamicValue) -> Result<Option<serde_json::Value>, Diagnostic> {
        match planned.get_dynamic(&AttributePath::new("value")) {
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) | Err(_) => Ok(None),
            Ok(value) => value.to_json().map(Some).map_err(|e| {
                Diagnostic::error(
                    "Invalid behavior value",
                    format!("could not encode value as JSON: {}", e),
                )
                .with_attribute(AttributePath::new("value"))
            }),
        }
    }
}

#[async_trait]
impl Resource for BehaviorResource {
    fn type_name(&self) -> &str {
        "filehub_behavior"
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
            .description("Attaches a behavior to a FileHub folder")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Behavior ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("path", AttributeType::String)
                    .description("Folder path the behavior applies to")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("behavior", AttributeType::String)
                    .description("Behavior kind")
                    .required()
                    .validator(OneOf::new(&[
                        "webhook",
                        "file_expiration",
                        "auto_encrypt",
                        "storage_region",
                    ]))
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("value", AttributeType::Dynamic)
                    .description("Behavior settings document; shape depends on the kind")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .description("Keep the behavior but stop applying it")
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

        let path = match request
            .planned_state
            .get_string(&AttributePath::new("path"))
        {
            Ok(path) => path,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing path",
                    "The 'path' attribute is required",
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };
        let behavior = match request
            .planned_state
            .get_string(&AttributePath::new("behavior"))
        {
            Ok(behavior) => behavior,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing behavior",
                    "The 'behavior' attribute is required",
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };
        let value = match Self::extract_value(&request.planned_state) {
            Ok(value) => value,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let create_request = CreateBehaviorRequest {
            path,
            behavior,
            value,
            disabled: request
                .planned_state
                .get_bool(&AttributePath::new("disabled"))
                .ok(),
        };

        match provider_data
            .client
            .behaviors()
            .create(&create_request)
            .await
        {
            Ok(behavior) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &behavior);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create behavior",
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

        match provider_data.client.behaviors().find(id).await {
            Ok(behavior) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &behavior);
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
                    "Failed to read behavior",
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
                    "Missing behavior ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let value = match Self::extract_value(&request.planned_state) {
            Ok(value) => value,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let update_request = UpdateBehaviorRequest {
            value,
            disabled: request
                .planned_state
                .get_bool(&AttributePath::new("disabled"))
                .ok(),
        };

        match provider_data
            .client
            .behaviors()
            .update(id, &update_request)
            .await
        {
            Ok(behavior) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &behavior);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update behavior",
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

        match provider_data.client.behaviors().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete behavior",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for BehaviorResource {
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
impl ResourceWithImportState for BehaviorResource {
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
    use crate::api::Client;
    use crate::FileHubProviderData;
    use mockito::Server;
    use tfkit::has_errors;
    use tfkit::resource::ResourceSchemaRequest;

    fn resource_for(server: &Server) -> BehaviorResource {
        let client = Client::new(&server.url(), "test-key").unwrap();
        BehaviorResource {
            provider_data: Some(FileHubProviderData::new(client)),
        }
    }

    #[tokio::test]
    async fn read_bridges_value_json_into_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/behaviors/8")
            .with_body(
                r#"{"id":8,"path":"uploads","behavior":"webhook",
                    "value":{"urls":["https://hooks.example.com/f"],"method":"POST"}}"#,
            )
            .create_async()
            .await;

        let mut current = DynamicValue::empty_object();
        current.set_i64(&AttributePath::new("id"), 8).unwrap();

        let resource = resource_for(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "filehub_behavior".to_string(),
                    current_state: current,
                },
            )
            .await;

        let state = response.new_state.unwrap();
        let value = state.get_dynamic(&AttributePath::new("value")).unwrap();
        assert_eq!(
            value.to_json().unwrap(),
            serde_json::json!({"urls": ["https://hooks.example.com/f"], "method": "POST"})
        );
    }

    #[tokio::test]
    async fn moving_the_behavior_forces_replacement() {
        let server = Server::new_async().await;
        let resource = resource_for(&server);
        let schema = resource
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        let mut prior = DynamicValue::empty_object();
        prior.set_i64(&AttributePath::new("id"), 8).unwrap();
        prior
            .set_string(&AttributePath::new("path"), "uploads".to_string())
            .unwrap();
        prior
            .set_string(&AttributePath::new("behavior"), "webhook".to_string())
            .unwrap();
        prior.set_bool(&AttributePath::new("disabled"), false).unwrap();

        let mut config = DynamicValue::empty_object();
        config
            .set_string(&AttributePath::new("path"), "archive".to_string())
            .unwrap();
        config
            .set_string(&AttributePath::new("behavior"), "webhook".to_string())
            .unwrap();

        let change = tfkit::plan_resource_change(&schema, &config, &prior);
        assert_eq!(change.requires_replace, vec![AttributePath::new("path")]);
        assert!(!has_errors(&change.diagnostics));
    }
}
