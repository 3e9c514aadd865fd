//! Group membership resource implementation
//!
//! The import ID is the composite `group_id,user_id`; the server-assigned
//! membership ID is recovered on the first read.

use async_trait::async_trait;
use tfkit::context::Context;
use tfkit::defaults::StaticBool;
use tfkit::import::split_composite_id;
use tfkit::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfkit::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceMetadataRequest,
    ResourceMetadataResponse, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfkit::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfkit::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::group_users::{CreateGroupUserRequest, GroupUser, UpdateGroupUserRequest};

#[derive(Default)]
pub struct GroupUserResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl GroupUserResource {
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

    fn populate_state(state: &mut DynamicValue, membership: &GroupUser) {
        let _ = state.set_i64(&AttributePath::new("id"), membership.id);
        let _ = state.set_i64(&AttributePath::new("group_id"), membership.group_id);
        let _ = state.set_i64(&AttributePath::new("user_id"), membership.user_id);
        let _ = state.set_bool(
            &AttributePath::new("admin"),
            membership.admin.unwrap_or(false),
        );
    }

    fn extract_pair(value: &DynamicValue) -> Result<(i64, i64), Diagnostic> {
        let group_id = value.get_i64(&AttributePath::new("group_id")).map_err(|_| {
            Diagnostic::error("Missing group_id", "The 'group_id' attribute is required")
        })?;
        let user_id = value.get_i64(&AttributePath::new("user_id")).map_err(|_| {
            Diagnostic::error("Missing user_id", "The 'user_id' attribute is required")
        })?;
        Ok((group_id, user_id))
    }
}

#[async_trait]
impl Resource for GroupUserResource {
    fn type_name(&self) -> &str {
        "filehub_group_user"
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
            .description("Manages a user's membership in a FileHub group")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Membership ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("group_id", AttributeType::Number)
                    .description("Group the user belongs to")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("user_id", AttributeType::Number)
                    .description("Member user")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("admin", AttributeType::Bool)
                    .description("Grant group administration rights")
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

        let (group_id, user_id) = match Self::extract_pair(&request.planned_state) {
            Ok(pair) => pair,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let create_request = CreateGroupUserRequest {
            group_id,
            user_id,
            admin: request
                .planned_state
                .get_bool(&AttributePath::new("admin"))
                .ok(),
        };

        match provider_data
            .client
            .group_users()
            .create(&create_request)
            .await
        {
            Ok(membership) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &membership);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create group membership",
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

        let (group_id, user_id) = match Self::extract_pair(&request.current_state) {
            Ok(pair) => pair,
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

        match provider_data
            .client
            .group_users()
            .find_by_pair(group_id, user_id)
            .await
        {
            Ok(membership) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &membership);
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
                    "Failed to read group membership",
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
                    "Missing membership ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let update_request = UpdateGroupUserRequest {
            admin: request
                .planned_state
                .get_bool(&AttributePath::new("admin"))
                .ok(),
        };

        match provider_data
            .client
            .group_users()
            .update(id, &update_request)
            .await
        {
            Ok(membership) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &membership);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update group membership",
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

        match provider_data.client.group_users().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete group membership",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for GroupUserResource {
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
impl ResourceWithImportState for GroupUserResource {
    /// Import ID format: `group_id,user_id`.
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        let parts = match split_composite_id(&request.id, 2) {
            Ok(parts) => parts,
            Err(diag) => {
                response.diagnostics.push(diag);
                return response;
            }
        };

        let (group_id, user_id) = match (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
            (Ok(group_id), Ok(user_id)) => (group_id, user_id),
            _ => {
                response.diagnostics.push(Diagnostic::error(
                    "Invalid import ID",
                    format!(
                        "expected numeric 'group_id,user_id', got '{}'",
                        request.id
                    ),
                ));
                return response;
            }
        };

        let mut state = DynamicValue::empty_object();
        let _ = state.set_i64(&AttributePath::new("group_id"), group_id);
        let _ = state.set_i64(&AttributePath::new("user_id"), user_id);

        response.imported_resources.push(ImportedResource {
            type_name: request.type_name.clone(),
            state,
        });
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
    use tfkit::types::Dynamic;

    fn resource_for(server: &Server) -> GroupUserResource {
        let client = Client::new(&server.url(), "test-key").unwrap();
        GroupUserResource {
            provider_data: Some(FileHubProviderData::new(client)),
        }
    }

    #[tokio::test]
    async fn import_splits_composite_id() {
        let server = Server::new_async().await;
        let resource = resource_for(&server);

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "filehub_group_user".to_string(),
                    id: "17,93".to_string(),
                },
            )
            .await;

        assert!(!has_errors(&response.diagnostics));
        let state = &response.imported_resources[0].state;
        assert_eq!(state.get_i64(&AttributePath::new("group_id")).unwrap(), 17);
        assert_eq!(state.get_i64(&AttributePath::new("user_id")).unwrap(), 93);
    }

    #[tokio::test]
    async fn import_rejects_wrong_arity_and_non_numeric_parts() {
        let server = Server::new_async().await;
        let resource = resource_for(&server);

        for bad in ["17", "17,93,4", "seventeen,93"] {
            let response = resource
                .import_state(
                    Context::new(),
                    ImportResourceStateRequest {
                        type_name: "filehub_group_user".to_string(),
                        id: bad.to_string(),
                    },
                )
                .await;
            assert!(has_errors(&response.diagnostics), "id '{}' should fail", bad);
            assert!(response.imported_resources.is_empty());
        }
    }

    #[tokio::test]
    async fn changing_either_key_forces_replacement() {
        let server = Server::new_async().await;
        let resource = resource_for(&server);

        let schema = resource
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        let mut prior = DynamicValue::empty_object();
        prior.set_i64(&AttributePath::new("id"), 300).unwrap();
        prior.set_i64(&AttributePath::new("group_id"), 17).unwrap();
        prior.set_i64(&AttributePath::new("user_id"), 93).unwrap();
        prior.set_bool(&AttributePath::new("admin"), false).unwrap();

        let mut config = DynamicValue::empty_object();
        config.set_i64(&AttributePath::new("group_id"), 18).unwrap();
        config.set_i64(&AttributePath::new("user_id"), 93).unwrap();

        let change = tfkit::plan_resource_change(&schema, &config, &prior);

        assert_eq!(
            change.requires_replace,
            vec![AttributePath::new("group_id")]
        );
        // Membership ID survives the plan via UseStateForUnknown.
        assert_eq!(
            change
                .planned_state
                .get_i64(&AttributePath::new("id"))
                .unwrap(),
            300
        );
        // The admin default lands in the plan.
        assert_eq!(
            change
                .planned_state
                .get_dynamic(&AttributePath::new("admin"))
                .unwrap(),
            Dynamic::Bool(false)
        );
    }

    #[tokio::test]
    async fn read_resolves_membership_by_pair() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/group_users")
            .match_query(mockito::Matcher::UrlEncoded("group_id".into(), "17".into()))
            .with_body(r#"[{"id":300,"group_id":17,"user_id":93,"admin":true}]"#)
            .create_async()
            .await;

        let mut current = DynamicValue::empty_object();
        current.set_i64(&AttributePath::new("group_id"), 17).unwrap();
        current.set_i64(&AttributePath::new("user_id"), 93).unwrap();

        let resource = resource_for(&server);
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "filehub_group_user".to_string(),
                    current_state: current,
                },
            )
            .await;

        let state = response.new_state.unwrap();
        assert_eq!(state.get_i64(&AttributePath::new("id")).unwrap(), 300);
        assert!(state.get_bool(&AttributePath::new("admin")).unwrap());
    }
}
