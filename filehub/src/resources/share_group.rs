//! Share group resource implementation
//!
//! Members are a nested list of objects, converted element by element
//! between the attribute tree and the API payload.

use async_trait::async_trait;
use std::collections::HashMap;
use tfkit::context::Context;
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

use crate::api::share_groups::{
    CreateShareGroupRequest, ShareGroup, ShareGroupMember, UpdateShareGroupRequest,
};

#[derive(Default)]
pub struct ShareGroupResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl ShareGroupResource {
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

    fn member_type() -> AttributeType {
        AttributeType::Object(HashMap::from([
            ("name".to_string(), AttributeType::String),
            ("company".to_string(), AttributeType::String),
            ("email".to_string(), AttributeType::String),
        ]))
    }

    fn members_to_dynamic(members: &[ShareGroupMember]) -> Dynamic {
        Dynamic::List(
            members
                .iter()
                .map(|member| {
                    let mut fields = HashMap::new();
                    fields.insert(
                        "email".to_string(),
                        Dynamic::String(member.email.clone()),
                    );
                    fields.insert(
                        "name".to_string(),
                        member
                            .name
                            .clone()
                            .map(Dynamic::String)
                            .unwrap_or(Dynamic::Null),
                    );
                    fields.insert(
                        "company".to_string(),
                        member
                            .company
                            .clone()
                            .map(Dynamic::String)
                            .unwrap_or(Dynamic::Null),
                    );
                    Dynamic::Map(fields)
                })
                .collect(),
        )
    }

    fn extract_members(planned: &DynamicValue) -> Result<Option<Vec<ShareGroupMember>>, Diagnostic> {
        let items = match planned.get_list(&AttributePath::new("members")) {
            Ok(items) => items,
            Err(_) => return Ok(None),
        };

        let mut members = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            let path = AttributePath::new("members").index(idx as i64);
            let fields = match item {
                Dynamic::Map(fields) => fields,
                other => {
                    return Err(Diagnostic::error(
                        "Invalid member",
                        format!("expected an object, got {}", other.type_name()),
                    )
                    .with_attribute(path))
                }
            };

            let email = match fields.get("email") {
                Some(Dynamic::String(email)) => email.clone(),
                _ => {
                    return Err(Diagnostic::error(
                        "Invalid member",
                        "each member requires an 'email'",
                    )
                    .with_attribute(path.attribute("email")))
                }
            };

            members.push(ShareGroupMember {
                email,
                name: match fields.get("name") {
                    Some(Dynamic::String(name)) => Some(name.clone()),
                    _ => None,
                },
                company: match fields.get("company") {
                    Some(Dynamic::String(company)) => Some(company.clone()),
                    _ => None,
                },
            });
        }

        Ok(Some(members))
    }

    fn populate_state(state: &mut DynamicValue, share_group: &ShareGroup) {
        let _ = state.set_i64(&AttributePath::new("id"), share_group.id);
        let _ = state.set_string(&AttributePath::new("name"), share_group.name.clone());
        let _ = state.set_dynamic(
            &AttributePath::new("notes"),
            share_group
                .notes
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("members"),
            share_group
                .members
                .as_deref()
                .map(Self::members_to_dynamic)
                .unwrap_or(Dynamic::Null),
        );
    }
}

#[async_trait]
impl Resource for ShareGroupResource {
    fn type_name(&self) -> &str {
        "filehub_share_group"
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
            .description("Manages a share group (external collaborators bundled for sharing)")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Share group ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Share group name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("notes", AttributeType::String)
                    .description("Administrator notes")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "members",
                    AttributeType::List(Box::new(Self::member_type())),
                )
                .description("Recipients in this share group")
                .optional()
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

        let name = match request.planned_state.get_string(&AttributePath::new("name")) {
            Ok(name) => name,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing name",
                    "The 'name' attribute is required",
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let members = match Self::extract_members(&request.planned_state) {
            Ok(members) => members,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let create_request = CreateShareGroupRequest {
            name,
            notes: request
                .planned_state
                .get_string(&AttributePath::new("notes"))
                .ok(),
            members,
        };

        match provider_data
            .client
            .share_groups()
            .create(&create_request)
            .await
        {
            Ok(share_group) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &share_group);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create share group",
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

        match provider_data.client.share_groups().find(id).await {
            Ok(share_group) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &share_group);
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
                    "Failed to read share group",
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
                    "Missing share group ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let members = match Self::extract_members(&request.planned_state) {
            Ok(members) => members,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let update_request = UpdateShareGroupRequest {
            name: request
                .planned_state
                .get_string(&AttributePath::new("name"))
                .ok(),
            notes: request
                .planned_state
                .get_string(&AttributePath::new("notes"))
                .ok(),
            members,
        };

        match provider_data
            .client
            .share_groups()
            .update(id, &update_request)
            .await
        {
            Ok(share_group) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &share_group);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update share group",
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

        match provider_data.client.share_groups().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete share group",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for ShareGroupResource {
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
impl ResourceWithImportState for ShareGroupResource {
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

    #[test]
    fn members_round_trip_between_state_and_api_shape() {
        let members = vec![
            ShareGroupMember {
                name: Some("Ada".to_string()),
                company: None,
                email: "ada@example.com".to_string(),
            },
            ShareGroupMember {
                name: None,
                company: Some("Initech".to_string()),
                email: "bob@initech.example".to_string(),
            },
        ];

        let mut state = DynamicValue::empty_object();
        state
            .set_dynamic(
                &AttributePath::new("members"),
                ShareGroupResource::members_to_dynamic(&members),
            )
            .unwrap();

        let extracted = ShareGroupResource::extract_members(&state)
            .unwrap()
            .unwrap();
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].email, "ada@example.com");
        assert_eq!(extracted[0].name.as_deref(), Some("Ada"));
        assert_eq!(extracted[1].company.as_deref(), Some("Initech"));
    }

    #[test]
    fn members_without_email_are_rejected() {
        let mut state = DynamicValue::empty_object();
        state
            .set_dynamic(
                &AttributePath::new("members"),
                Dynamic::List(vec![Dynamic::Map(HashMap::from([(
                    "name".to_string(),
                    Dynamic::String("No Email".to_string()),
                )]))]),
            )
            .unwrap();

        let err = ShareGroupResource::extract_members(&state).unwrap_err();
        assert!(err.detail.contains("email"));
    }
}
