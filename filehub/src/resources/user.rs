//! User resource implementation

use async_trait::async_trait;
use tfkit::context::Context;
use tfkit::defaults::{StaticBool, StaticString};
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

use crate::api::users::{CreateUserRequest, UpdateUserRequest, User};

#[derive(Default)]
pub struct UserResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl UserResource {
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

    /// Copy every API field into state. Write-only attributes (password)
    /// are left untouched.
    fn populate_state(state: &mut DynamicValue, user: &User) {
        let _ = state.set_i64(&AttributePath::new("id"), user.id);
        let _ = state.set_string(&AttributePath::new("username"), user.username.clone());
        let _ = state.set_dynamic(
            &AttributePath::new("email"),
            user.email.clone().map(Dynamic::String).unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("name"),
            user.name.clone().map(Dynamic::String).unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("notes"),
            user.notes.clone().map(Dynamic::String).unwrap_or(Dynamic::Null),
        );
        let _ = state.set_bool(
            &AttributePath::new("site_admin"),
            user.site_admin.unwrap_or(false),
        );
        let _ = state.set_bool(
            &AttributePath::new("disabled"),
            user.disabled.unwrap_or(false),
        );
        let _ = state.set_string(
            &AttributePath::new("authentication_method"),
            user.authentication_method
                .clone()
                .unwrap_or_else(|| "password".to_string()),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("group_ids"),
            user.group_ids
                .as_deref()
                .map(super::ids_to_dynamic)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("created_at"),
            user.created_at
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
    }

    fn extract_create_request(planned: &DynamicValue) -> Result<CreateUserRequest, Diagnostic> {
        let username = planned
            .get_string(&AttributePath::new("username"))
            .map_err(|_| {
                Diagnostic::error("Missing username", "The 'username' attribute is required")
            })?;

        Ok(CreateUserRequest {
            username,
            password: planned.get_string(&AttributePath::new("password")).ok(),
            email: planned.get_string(&AttributePath::new("email")).ok(),
            name: planned.get_string(&AttributePath::new("name")).ok(),
            notes: planned.get_string(&AttributePath::new("notes")).ok(),
            site_admin: planned.get_bool(&AttributePath::new("site_admin")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
            authentication_method: planned
                .get_string(&AttributePath::new("authentication_method"))
                .ok(),
            group_ids: super::ids_from_list(planned, &AttributePath::new("group_ids")),
        })
    }

    fn extract_update_request(planned: &DynamicValue) -> UpdateUserRequest {
        UpdateUserRequest {
            username: planned.get_string(&AttributePath::new("username")).ok(),
            password: planned.get_string(&AttributePath::new("password")).ok(),
            email: planned.get_string(&AttributePath::new("email")).ok(),
            name: planned.get_string(&AttributePath::new("name")).ok(),
            notes: planned.get_string(&AttributePath::new("notes")).ok(),
            site_admin: planned.get_bool(&AttributePath::new("site_admin")).ok(),
            disabled: planned.get_bool(&AttributePath::new("disabled")).ok(),
            authentication_method: planned
                .get_string(&AttributePath::new("authentication_method"))
                .ok(),
            group_ids: super::ids_from_list(planned, &AttributePath::new("group_ids")),
        }
    }
}

#[async_trait]
impl Resource for UserResource {
    fn type_name(&self) -> &str {
        "filehub_user"
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
            .description("Manages a FileHub user account")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("User ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("Login name, unique per site")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("email", AttributeType::String)
                    .description("Email address")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Display name")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("notes", AttributeType::String)
                    .description("Administrator notes")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Password; never returned by the API")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("site_admin", AttributeType::Bool)
                    .description("Grant site-wide administration rights")
                    .optional()
                    .default(StaticBool::create(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disabled", AttributeType::Bool)
                    .description("Block the user from signing in")
                    .optional()
                    .default(StaticBool::create(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("authentication_method", AttributeType::String)
                    .description("How the user authenticates (password, sso, none)")
                    .optional()
                    .validator(OneOf::new(&["password", "sso", "none"]))
                    .default(StaticString::create("password"))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "group_ids",
                    AttributeType::List(Box::new(AttributeType::Number)),
                )
                .description("IDs of groups the user belongs to")
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .description("Creation timestamp")
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

        match provider_data.client.users().create(&create_request).await {
            Ok(user) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &user);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create user",
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
                // State without an ID cannot be refreshed; mark it gone.
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

        match provider_data.client.users().find(id).await {
            Ok(user) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &user);
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
                    "Failed to read user",
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
                    "Missing user ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let update_request = Self::extract_update_request(&request.planned_state);

        match provider_data.client.users().update(id, &update_request).await {
            Ok(user) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &user);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update user",
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
                // Nothing identifiable to delete.
                return DeleteResourceResponse { diagnostics };
            }
        };

        match provider_data.client.users().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete user",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for UserResource {
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
impl ResourceWithImportState for UserResource {
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
    use mockito::{Matcher, Server};
    use tfkit::has_errors;

    fn resource_for(server: &Server) -> UserResource {
        let client = Client::new(&server.url(), "test-key").unwrap();
        UserResource {
            provider_data: Some(FileHubProviderData::new(client)),
        }
    }

    fn planned_state() -> DynamicValue {
        let mut planned = DynamicValue::empty_object();
        planned.mark_unknown(&AttributePath::new("id")).unwrap();
        planned
            .set_string(&AttributePath::new("username"), "jdoe".to_string())
            .unwrap();
        planned
            .set_string(&AttributePath::new("email"), "jdoe@example.com".to_string())
            .unwrap();
        planned
            .set_bool(&AttributePath::new("site_admin"), false)
            .unwrap();
        planned
            .mark_unknown(&AttributePath::new("created_at"))
            .unwrap();
        planned
    }

    #[tokio::test]
    async fn create_populates_computed_attributes() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/users")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "username": "jdoe",
                "email": "jdoe@example.com"
            })))
            .with_body(
                r#"{"id":42,"username":"jdoe","email":"jdoe@example.com",
                    "site_admin":false,"created_at":"2026-01-12T08:30:00Z"}"#,
            )
            .create_async()
            .await;

        let resource = resource_for(&server);
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "filehub_user".to_string(),
                    config: planned_state(),
                    planned_state: planned_state(),
                },
            )
            .await;

        assert!(!has_errors(&response.diagnostics));
        assert_eq!(
            response
                .new_state
                .get_i64(&AttributePath::new("id"))
                .unwrap(),
            42
        );
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("created_at"))
                .unwrap(),
            "2026-01-12T08:30:00Z"
        );
    }

    #[tokio::test]
    async fn read_refreshes_state_from_api() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/42")
            .with_body(r#"{"id":42,"username":"renamed","group_ids":[3]}"#)
            .create_async()
            .await;

        let mut current = planned_state();
        current.set_i64(&AttributePath::new("id"), 42).unwrap();

        let resource = resource_for(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "filehub_user".to_string(),
                    current_state: current,
                },
            )
            .await;

        let state = response.new_state.unwrap();
        assert_eq!(
            state.get_string(&AttributePath::new("username")).unwrap(),
            "renamed"
        );
        assert_eq!(
            state.get_list(&AttributePath::new("group_ids")).unwrap(),
            vec![Dynamic::Number(3.0)]
        );
    }

    #[tokio::test]
    async fn read_removes_state_when_user_is_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/42")
            .with_status(404)
            .with_body(r#"{"error":"Not Found","http_code":404}"#)
            .create_async()
            .await;

        let mut current = planned_state();
        current.set_i64(&AttributePath::new("id"), 42).unwrap();

        let resource = resource_for(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "filehub_user".to_string(),
                    current_state: current,
                },
            )
            .await;

        assert!(response.new_state.is_none());
        assert!(!has_errors(&response.diagnostics));
    }

    #[tokio::test]
    async fn read_surfaces_other_errors_verbatim() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/42")
            .with_status(500)
            .with_body(r#"{"error":"Internal Server Error"}"#)
            .create_async()
            .await;

        let mut current = planned_state();
        current.set_i64(&AttributePath::new("id"), 42).unwrap();

        let resource = resource_for(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "filehub_user".to_string(),
                    current_state: current,
                },
            )
            .await;

        assert!(response.new_state.is_some());
        assert!(has_errors(&response.diagnostics));
        assert!(response.diagnostics[0].detail.contains("500"));
    }

    #[tokio::test]
    async fn delete_tolerates_already_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/users/42")
            .with_status(404)
            .with_body(r#"{"error":"Not Found","http_code":404}"#)
            .create_async()
            .await;

        let mut prior = planned_state();
        prior.set_i64(&AttributePath::new("id"), 42).unwrap();

        let resource = resource_for(&server);
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "filehub_user".to_string(),
                    prior_state: prior,
                },
            )
            .await;

        assert!(!has_errors(&response.diagnostics));
    }

    #[tokio::test]
    async fn import_parses_numeric_id() {
        let server = Server::new_async().await;
        let resource = resource_for(&server);

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "filehub_user".to_string(),
                    id: "42".to_string(),
                },
            )
            .await;

        assert!(!has_errors(&response.diagnostics));
        assert_eq!(
            response.imported_resources[0]
                .state
                .get_i64(&AttributePath::new("id"))
                .unwrap(),
            42
        );
    }
}
