//! AS2 station resource implementation

use async_trait::async_trait;
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

use crate::api::as2_stations::{As2Station, CreateAs2StationRequest, UpdateAs2StationRequest};

#[derive(Default)]
pub struct As2StationResource {
    provider_data: Option<crate::FileHubProviderData>,
}

impl As2StationResource {
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

    /// The private key is write-only and left untouched.
    fn populate_state(state: &mut DynamicValue, station: &As2Station) {
        let _ = state.set_i64(&AttributePath::new("id"), station.id);
        let _ = state.set_string(&AttributePath::new("name"), station.name.clone());
        let _ = state.set_dynamic(
            &AttributePath::new("uri"),
            station
                .uri
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
        let _ = state.set_dynamic(
            &AttributePath::new("public_certificate"),
            station
                .public_certificate
                .clone()
                .map(Dynamic::String)
                .unwrap_or(Dynamic::Null),
        );
    }

    fn extract_create_request(
        planned: &DynamicValue,
    ) -> Result<CreateAs2StationRequest, Diagnostic> {
        let name = planned.get_string(&AttributePath::new("name")).map_err(|_| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
        })?;
        let public_certificate = planned
            .get_string(&AttributePath::new("public_certificate"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing public_certificate",
                    "The 'public_certificate' attribute is required",
                )
            })?;
        let private_key = planned
            .get_string(&AttributePath::new("private_key"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing private_key",
                    "The 'private_key' attribute is required",
                )
            })?;

        Ok(CreateAs2StationRequest {
            name,
            public_certificate,
            private_key,
        })
    }
}

#[async_trait]
impl Resource for As2StationResource {
    fn type_name(&self) -> &str {
        "filehub_as2_station"
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
            .description("Manages this site's AS2 station")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Station ID, assigned by FileHub")
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Station name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("public_certificate", AttributeType::String)
                    .description("PEM-encoded station certificate")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("private_key", AttributeType::String)
                    .description("PEM-encoded private key; never returned by the API")
                    .required()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uri", AttributeType::String)
                    .description("AS2 endpoint URI, assigned server-side")
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

        match provider_data
            .client
            .as2_stations()
            .create(&create_request)
            .await
        {
            Ok(station) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &station);
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create AS2 station",
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

        match provider_data.client.as2_stations().find(id).await {
            Ok(station) => {
                let mut new_state = request.current_state.clone();
                Self::populate_state(&mut new_state, &station);
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
                    "Failed to read AS2 station",
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
                    "Missing AS2 station ID",
                    format!("prior state has no usable 'id': {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let planned = &request.planned_state;
        let update_request = UpdateAs2StationRequest {
            name: planned.get_string(&AttributePath::new("name")).ok(),
            public_certificate: planned
                .get_string(&AttributePath::new("public_certificate"))
                .ok(),
            private_key: planned.get_string(&AttributePath::new("private_key")).ok(),
        };

        match provider_data
            .client
            .as2_stations()
            .update(id, &update_request)
            .await
        {
            Ok(station) => {
                let mut new_state = request.planned_state;
                Self::populate_state(&mut new_state, &station);
                UpdateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update AS2 station",
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

        match provider_data.client.as2_stations().delete(id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete AS2 station",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for As2StationResource {
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
impl ResourceWithImportState for As2StationResource {
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
