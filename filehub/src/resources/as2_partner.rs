//! AS2 partner resource implementation
//!
//! A partner's station binding is immutable: `as2_station_id` carries a
//! replace-on-change marker and the update request has no such field.

use async_trait::async_trait;
use tfkit::context::Context;
use tfkit::defaults::{StaticBool, StaticString};
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

use crate::api::as2_partners::{As2Partner, CreateAs2PartnerRequest, UpdateAs2PartnerRequest};

#[derive(Default)]
pub struct As2PartnerResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl As2PartnerResource {
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

    fn populate_state(state: &mut DynamicValue, partner: &As2Partner) {
        let _ = state.set_i64(&AttributePath::new("id"), partner.id);
        let _ = state.set_string(&AttributePath::new("name"), partner.name.clone());
        let _ = state.set_i64(
            &AttributePath::new("as2_station_id"),
            partner.as2_station_id,
        );
        let _ = state.set_dynamic(
            &AttributePath::new("uri"),
            partner
                .uri
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("public_certificate"),
            partner
                .public_certificate
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_string(
            &AttributePath::new("mdn_validation_level"),
            partner
                .mdn_validation_level
                .clone()
                .unwrap_or_else(|| "none".to_string()),
        );
        let _ = state.set_bool(
            &AttributePath::new("enable_dedicated_ips"),
            partner.enable_dedicated_ips.unwrap_or(false),
        );
    }

    fn extract_create_request(
        planned: &DynamicValue,
    ) -> Result<CreateAs2PartnerRequest, Diagnostic> {
        let name = planned.get_string(&AttributePath::new("name")).map_err(|_| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
        })?;
        let as2_station_id = planned
            .get_i64(&AttributePath::new("as2_station_id"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing as2_station_id",
                    "The 'as2_station_id' attribute is required",
                )
            })?;
        let uri = planned.get_string(&AttributePath::new("uri")).map_err(|_| {
            Diagnostic::error("Missing uri", "The 'uri' attribute is required")
        })?;
        let public_certificate = planned
            .get_string(&AttributePath::new("public_certificate"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing public_certificate",
                    "The 'public_certificate' attribute is required",
                )
            })?;

        Ok(CreateAs2PartnerRequest {
            name,
            as2_station_id,
            uri,
            public_certificate,
            mdn_validation_level: planned
                .get_string(&AttributePath::new("mdn_validation_level"))
                .ok(),
            enable_dedicated_ips: planned
                .get_bool(&AttributePath::new("enable_dedicated_ips"))
                .ok(),
        })
    }
}

#[async_trait]
impl Resource for As2PartnerResource {
    fn type_name(&self) -> &str {
        "filehub_as2_partner"
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
            .description("Manages an AS2 trading partner")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Partner ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Partner name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("as2_station_id", AttributeType::Number)
                    .description("Station this partner exchanges messages with; cannot change after creation")
                    .required()
                    .plan_modifier(RequiresReplace::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uri", AttributeType::String)
                    .description("Partner's AS2 endpoint URL")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("public_certificate", AttributeType::String)
                    .description("PEM-encoded partner certificate")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("mdn_validation_level", AttributeType::String)
                    .description("How strictly MDN receipts are checked")
                    .optional()
                    .validator(OneOf::new(&["none", "weak", "strict"]))
                    .default(StaticString::create("none"))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enable_dedicated_ips", AttributeType::Bool)
                    .description("Send from the site's dedicated IP range")
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
            .as2_partners()
            .create(&create_request)
            .await
        {
            Ok(partner) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &partner);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create AS2 partner",
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

        match provider_data.client.as2_partners().find(id).await {
            Ok(partner) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &partner);
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
                    "Failed to read AS2 partner",
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
                    "Missing AS2 partner ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let planned = &request.planned_state;
        let update_request = UpdateAs2PartnerRequest {
            name: planned.get_string(&AttributePath::new("name")).ok(),
            uri: planned.get_string(&AttributePath::new("uri")).ok(),
            public_certificate: planned
                .get_string(&AttributePath::new("public_certificate"))
                .ok(),
            mdn_validation_level: planned
                .get_string(&AttributePath::new("mdn_validation_level"))
                .ok(),
            enable_dedicated_ips: planned
                .get_bool(&AttributePath::new("enable_dedicated_ips"))
                .ok(),
        };

        match provider_data
            .client
            .as2_partners()
            .update(id, &update_request)
            .await
        {
            Ok(partner) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &partner);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update AS2 partner",
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

        match provider_data.client.as2_partners().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete AS2 partner",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for As2PartnerResource {
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
impl ResourceWithImportState for As2PartnerResource {
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
    use tfkit::resource::ResourceSchemaRequest;

    fn prior_partner() -> DynamicValue {
        let mut prior = DynamicValue::empty_object();
        prior.set_i64(&AttributePath::new("id"), 9).unwrap();
        prior
            .set_string(&AttributePath::new("name"), "acme".to_string())
            .unwrap();
        prior.set_i64(&AttributePath::new("as2_station_id"), 7).unwrap();
        prior
            .set_string(&AttributePath::new("uri"), "https://as2.acme.example".to_string())
            .unwrap();
        prior
            .set_string(
                &AttributePath::new("public_certificate"),
                "-----BEGIN CERTIFICATE-----".to_string(),
            )
            .unwrap();
        prior
            .set_string(&AttributePath::new("mdn_validation_level"), "none".to_string())
            .unwrap();
        prior
            .set_bool(&AttributePath::new("enable_dedicated_ips"), false)
            .unwrap();
        prior
    }

    fn config_with_station(station_id: i64) -> DynamicValue {
        let mut config = DynamicValue::empty_object();
        config
            .set_string(&AttributePath::new("name"), "acme".to_string())
            .unwrap();
        config
            .set_i64(&AttributePath::new("as2_station_id"), station_id)
            .unwrap();
        config
            .set_string(&AttributePath::new("uri"), "https://as2.acme.example".to_string())
            .unwrap();
        config
            .set_string(
                &AttributePath::new("public_certificate"),
                "-----BEGIN CERTIFICATE-----".to_string(),
            )
            .unwrap();
        config
    }

    #[tokio::test]
    async fn changing_the_station_forces_replacement() {
        let resource = As2PartnerResource::new();
        let schema = resource
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        let change =
            tfkit::plan_resource_change(&schema, &config_with_station(8), &prior_partner());
        assert_eq!(
            change.requires_replace,
            vec![AttributePath::new("as2_station_id")]
        );
    }

    #[tokio::test]
    async fn keeping_the_station_does_not_force_replacement() {
        let resource = As2PartnerResource::new();
        let schema = resource
            .schema(Context::new(), ResourceSchemaRequest)
            .await
            .schema;

        let change =
            tfkit::plan_resource_change(&schema, &config_with_station(7), &prior_partner());
        assert!(change.requires_replace.is_empty());
        // The mdn default still lands in the plan.
        assert_eq!(
            change
                .planned_state
                .get_string(&AttributePath::new("mdn_validation_level"))
                .unwrap(),
            "none"
        );
    }
}
