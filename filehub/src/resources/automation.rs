//! Automation resource implementation
//!
//! `custom_schedule` is a dynamic attribute bridged to the API's free-form
//! JSON payload.

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

use crate::api::automations::{Automation, CreateAutomationRequest, UpdateAutomationRequest};

#[derive(Default)]
pub struct AutomationResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl AutomationResource {
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

    fn populate_state(state: &mut DynamicValue, automation: &Automation) {
        let _ = state.set_i64(&AttributePath::new("id"), automation.id);
        let _ = state.set_string(
            &AttributePath::new("automation_type"),
            automation.automation_type.clone(),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("source"),
            automation
                .source
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("destination"),
            automation
                .destination
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("path"),
            automation
                .path
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("interval"),
            automation
                .interval
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("custom_schedule"),
            automation
                .custom_schedule
                .as_ref()
                .map(Dynamic::from_json)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("user_id"),
            automation
                .user_id
                .map(|id| Dynamic::Number(id as f64))
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_bool(
            &AttributePath::new("disabled"),
            automation.disabled.unwrap_or(false),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("last_run_at"),
            automation
                .last_run_at
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
    }

    /// Encode the dynamic schedule attribute as JSON for the API, surfacing
    /// marshalling failures as diagnostics.
    fn extract_schedule(planned: &DynamicValue) -> Result<Option<serde_json::Value>, Diagnostic> {
        match planned.get_dynamic(&AttributePath::new("custom_schedule")) {
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) | Err(_) => Ok(None),
            Ok(value) => value.to_json().map(Some).map_err(|e| {
                Diagnostic::error(
                    "Invalid custom_schedule",
                    format!("could not encode value as JSON: {}", e),
                )
                .with_attribute(AttributePath::new("custom_schedule"))
            }),
        }
    }

    fn extract_create_request(
        planned: &DynamicValue,
    ) -> Result<CreateAutomationRequest, Diagnostic> {
        let automation_type = planned
            .get_string(&AttributePath::new("automation_type"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing automation_type",
                    "The 'automation_type' attribute is required",
                )
            })?;

        Ok(CreateAutomationRequest {
            automation_type,
            source: planned.get_string(&AttributePath::new("source")).ok(),
            destination: planned.get_string(&AttributePath::new("destination")).ok(),
            path: planned.get_string(&AttributePath::new("path")).ok(),
            interval: planned.get_string(&AttributePath::new("interval")).ok(),
            custom_schedule: Self::extract_schedule(planned)?,
            user_id: planned.get_i64(&AttributePath::new("user_id")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
        })
    }
}

#[async_trait]
impl Resource for AutomationResource {
    fn type_name(&self) -> &str {
        "filehub_automation"
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
            .description("Manages a FileHub automation")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Automation ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("automation_type", AttributeType::String)
                    .description("What the automation does")
                    .required()
                    .validator(OneOf::new(&[
                        "copy_file",
                        "move_file",
                        "delete_file",
                        "run_sync",
                    ]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("source", AttributeType::String)
                    .description("Source path glob")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("destination", AttributeType::String)
                    .description("Destination path template")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("path", AttributeType::String)
                    .description("Path the automation watches")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("interval", AttributeType::String)
                    .description("Built-in run cadence")
                    .optional()
                    .validator(OneOf::new(&["daily", "weekly", "monthly"]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("custom_schedule", AttributeType::Dynamic)
                    .description("Free-form schedule document (days, times)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("user_id", AttributeType::Number)
                    .description("User the automation runs as")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .description("Pause the automation")
                    .optional()
                    .default(StaticBool::create(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_run_at", AttributeType::String)
                    .description("Timestamp of the most recent run")
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
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        let has_interval = request
            .config
            .get_string(&AttributePath::new("interval"))
            .is_ok();
        let has_schedule = !matches!(
            request
                .config
                .get_dynamic(&AttributePath::new("custom_schedule")),
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) | Err(_)
        );

        if has_interval && has_schedule {
            diagnostics.push(Diagnostic::error(
                "Conflicting schedule settings",
                "'interval' and 'custom_schedule' cannot both be set",
            ));
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
            .automations()
            .create(&create_request)
            .await
        {
            Ok(automation) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &automation);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create automation",
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

        match provider_data.client.automations().find(id).await {
            Ok(automation) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &automation);
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
                    "Failed to read automation",
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
                    "Missing automation ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let custom_schedule = match Self::extract_schedule(&request.planned_state) {
            Ok(custom_schedule) => custom_schedule,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let planned = &request.planned_state;
        let update_request = UpdateAutomationRequest {
            source: planned.get_string(&AttributePath::new("source")).ok(),
            destination: planned.get_string(&AttributePath::new("destination")).ok(),
            path: planned.get_string(&AttributePath::new("path")).ok(),
            interval: planned.get_string(&AttributePath::new("interval")).ok(),
            custom_schedule,
            user_id: planned.get_i64(&AttributePath::new("user_id")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
        };

        match provider_data
            .client
            .automations()
            .update(id, &update_request)
            .await
        {
            Ok(automation) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &automation);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update automation",
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

        match provider_data.client.automations().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete automation",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for AutomationResource {
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
impl ResourceWithImportState for AutomationResource {
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

    fn resource_for(server: &Server) -> AutomationResource {
        let client = Client::new(&server.url(), "test-key").unwrap();
        AutomationResource {
            provider_data: Some(FileHubProviderData::new(client)),
        }
    }

    #[tokio::test]
    async fn interval_and_custom_schedule_are_mutually_exclusive() {
        let resource = AutomationResource::new();

        let mut config = DynamicValue::empty_object();
        config
            .set_string(
                &AttributePath::new("automation_type"),
                "copy_file".to_string(),
            )
            .unwrap();
        config
            .set_string(&AttributePath::new("interval"), "daily".to_string())
            .unwrap();
        config
            .set_dynamic(
                &AttributePath::new("custom_schedule"),
                Dynamic::from_json(&serde_json::json!({"days": [1]})),
            )
            .unwrap();

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "filehub_automation".to_string(),
                    config,
                },
            )
            .await;

        assert!(has_errors(&response.diagnostics));
    }

    #[tokio::test]
    async fn create_bridges_schedule_to_json_and_back() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/automations")
            .with_body(
                r#"{"id":11,"automation_type":"copy_file",
                    "custom_schedule":{"days":[1,5],"times":["06:30"]},
                    "last_run_at":null}"#,
            )
            .create_async()
            .await;

        let mut planned = DynamicValue::empty_object();
        planned.mark_unknown(&AttributePath::new("id")).unwrap();
        planned
            .set_string(
                &AttributePath::new("automation_type"),
                "copy_file".to_string(),
            )
            .unwrap();
        planned
            .set_dynamic(
                &AttributePath::new("custom_schedule"),
                Dynamic::from_json(&serde_json::json!({"days": [1, 5], "times": ["06:30"]})),
            )
            .unwrap();

        let resource = resource_for(&server);
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "filehub_automation".to_string(),
                    config: planned.clone(),
                    planned_state: planned,
                },
            )
            .await;

        assert!(!has_errors(&response.diagnostics));
        let schedule = response
            .new_state
            .get_dynamic(&AttributePath::new("custom_schedule"))
            .unwrap();
        assert_eq!(
            schedule.to_json().unwrap(),
            serde_json::json!({"days": [1, 5], "times": ["06:30"]})
        );
    }

    #[tokio::test]
    async fn unknown_schedule_is_a_marshalling_error() {
        let mut planned = DynamicValue::empty_object();
        planned
            .set_string(
                &AttributePath::new("automation_type"),
                "copy_file".to_string(),
            )
            .unwrap();
        planned
            .set_dynamic(
                &AttributePath::new("custom_schedule"),
                Dynamic::List(vec![Dynamic::Unknown]),
            )
            .unwrap();

        let err = AutomationResource::extract_schedule(&planned).unwrap_err();
        assert!(err.summary.contains("custom_schedule"));
    }
}
