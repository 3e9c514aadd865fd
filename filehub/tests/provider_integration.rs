//! Provider-level integration tests: configure the provider against a mock
//! FileHub API, instantiate adapters through the factories, and walk the
//! full plan/apply lifecycle the way the host would.

use mockito::{Matcher, Server};
use serial_test::serial;
use std::any::Any;
use std::sync::Arc;

use filehub::FileHubProvider;
use tfkit::context::Context;
use tfkit::data_source::{ConfigureDataSourceRequest, ReadDataSourceRequest};
use tfkit::provider::{ConfigureProviderRequest, Provider};
use tfkit::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest, UpdateResourceRequest,
};
use tfkit::types::{AttributePath, Dynamic, DynamicValue};
use tfkit::{has_errors, plan_resource_change, validate_config};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn configured_provider(server: &Server) -> (FileHubProvider, Arc<dyn Any + Send + Sync>) {
    init_tracing();
    let mut provider = FileHubProvider::new();

    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("endpoint"), server.url())
        .unwrap();
    config
        .set_string(&AttributePath::new("api_key"), "test-key".to_string())
        .unwrap();

    let response = provider
        .configure(Context::new(), ConfigureProviderRequest { config })
        .await;
    assert!(!has_errors(&response.diagnostics));

    (provider, response.provider_data.unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn user_resource_lifecycle_with_mock_server() {
    let mut server = Server::new_async().await;

    let create_mock = server
        .mock("POST", "/users")
        .match_header("x-filehub-api-key", "test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "username": "jdoe",
            "email": "jdoe@example.com"
        })))
        .with_body(
            r#"{"id":42,"username":"jdoe","email":"jdoe@example.com",
                "site_admin":false,"disabled":false,
                "created_at":"2026-03-01T09:00:00Z"}"#,
        )
        .create_async()
        .await;
    let read_mock = server
        .mock("GET", "/users/42")
        .with_body(
            r#"{"id":42,"username":"jdoe","email":"jdoe@example.com",
                "site_admin":false,"disabled":false,
                "created_at":"2026-03-01T09:00:00Z"}"#,
        )
        .create_async()
        .await;
    let update_mock = server
        .mock("PATCH", "/users/42")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "john.doe@example.com"
        })))
        .with_body(
            r#"{"id":42,"username":"jdoe","email":"john.doe@example.com",
                "site_admin":false,"disabled":false,
                "created_at":"2026-03-01T09:00:00Z"}"#,
        )
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", "/users/42")
        .with_status(204)
        .create_async()
        .await;

    let (provider, data) = configured_provider(&server).await;

    let mut resource = provider.create_resource("filehub_user").await.unwrap();
    let configure = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    assert!(!has_errors(&configure.diagnostics));

    let schema = resource
        .schema(Context::new(), ResourceSchemaRequest)
        .await
        .schema;

    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("username"), "jdoe".to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("email"), "jdoe@example.com".to_string())
        .unwrap();
    assert!(!has_errors(&validate_config(&schema, &config)));

    // Plan: the server-assigned id is unknown until create answers.
    let change = plan_resource_change(&schema, &config, &DynamicValue::null());
    assert!(change.requires_replace.is_empty());
    assert_eq!(
        change
            .planned_state
            .get_dynamic(&AttributePath::new("id"))
            .unwrap(),
        Dynamic::Unknown
    );

    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "filehub_user".to_string(),
                config: config.clone(),
                planned_state: change.planned_state,
            },
        )
        .await;
    assert!(!has_errors(&created.diagnostics));
    assert_eq!(
        created.new_state.get_i64(&AttributePath::new("id")).unwrap(),
        42
    );
    create_mock.assert_async().await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "filehub_user".to_string(),
                current_state: created.new_state.clone(),
            },
        )
        .await;
    let read_state = read.new_state.expect("user should still exist");
    assert_eq!(
        read_state
            .get_string(&AttributePath::new("username"))
            .unwrap(),
        "jdoe"
    );
    read_mock.assert_async().await;

    // Update keeps the identifier through UseStateForUnknown.
    let mut new_config = config.clone();
    new_config
        .set_string(
            &AttributePath::new("email"),
            "john.doe@example.com".to_string(),
        )
        .unwrap();
    let change = plan_resource_change(&schema, &new_config, &read_state);
    assert_eq!(
        change
            .planned_state
            .get_i64(&AttributePath::new("id"))
            .unwrap(),
        42
    );

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "filehub_user".to_string(),
                config: new_config,
                planned_state: change.planned_state,
                prior_state: read_state,
            },
        )
        .await;
    assert!(!has_errors(&updated.diagnostics));
    assert_eq!(
        updated
            .new_state
            .get_string(&AttributePath::new("email"))
            .unwrap(),
        "john.doe@example.com"
    );
    update_mock.assert_async().await;

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "filehub_user".to_string(),
                prior_state: updated.new_state,
            },
        )
        .await;
    assert!(!has_errors(&deleted.diagnostics));
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn read_after_remote_deletion_clears_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/syncs/12")
        .with_status(404)
        .with_body(r#"{"error":"Not Found","http_code":404}"#)
        .create_async()
        .await;

    let (provider, data) = configured_provider(&server).await;

    let mut resource = provider.create_resource("filehub_sync").await.unwrap();
    resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data),
            },
        )
        .await;

    let mut state = DynamicValue::empty_object();
    state.set_i64(&AttributePath::new("id"), 12).unwrap();

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "filehub_sync".to_string(),
                current_state: state,
            },
        )
        .await;

    assert!(!has_errors(&read.diagnostics));
    assert!(read.new_state.is_none());
}

#[tokio::test]
async fn data_source_reads_through_the_provider() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/remote_servers/5")
        .match_header("x-filehub-api-key", "test-key")
        .with_body(
            r#"{"id":5,"name":"backup-sftp","server_type":"sftp",
                "hostname":"sftp.example.com","port":22,"username":"backup"}"#,
        )
        .create_async()
        .await;

    let (provider, data) = configured_provider(&server).await;

    let mut data_source = provider
        .create_data_source("filehub_remote_server")
        .await
        .unwrap();
    let configure = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    assert!(!has_errors(&configure.diagnostics));

    let mut config = DynamicValue::empty_object();
    config.set_i64(&AttributePath::new("id"), 5).unwrap();

    let response = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "filehub_remote_server".to_string(),
                config,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(
        response
            .state
            .get_string(&AttributePath::new("hostname"))
            .unwrap(),
        "sftp.example.com"
    );
    assert_eq!(
        response.state.get_i64(&AttributePath::new("port")).unwrap(),
        22
    );
}

#[tokio::test]
async fn import_parses_numeric_and_composite_ids() {
    use filehub::resources::{AutomationResource, GroupUserResource};
    use tfkit::resource::ResourceWithImportState;

    // Single numeric ID.
    let response = AutomationResource::new()
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "filehub_automation".to_string(),
                id: "204".to_string(),
            },
        )
        .await;
    assert!(!has_errors(&response.diagnostics));
    assert_eq!(
        response.imported_resources[0]
            .state
            .get_i64(&AttributePath::new("id"))
            .unwrap(),
        204
    );

    // Comma-delimited composite ID.
    let response = GroupUserResource::new()
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

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn provider_uses_env_vars_when_config_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/users/7")
        .match_header("x-filehub-api-key", "env-key")
        .with_body(r#"{"id":7,"username":"svc-backup"}"#)
        .create_async()
        .await;

    std::env::set_var("FILEHUB_ENDPOINT", server.url());
    std::env::set_var("FILEHUB_API_KEY", "env-key");

    let mut provider = FileHubProvider::new();
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                config: DynamicValue::empty_object(),
            },
        )
        .await;
    assert!(!has_errors(&response.diagnostics));

    let mut data_source = provider.create_data_source("filehub_user").await.unwrap();
    data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: response.provider_data,
            },
        )
        .await;

    let mut config = DynamicValue::empty_object();
    config.set_i64(&AttributePath::new("id"), 7).unwrap();

    let read = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "filehub_user".to_string(),
                config,
            },
        )
        .await;
    assert!(!has_errors(&read.diagnostics));
    assert_eq!(
        read.state
            .get_string(&AttributePath::new("username"))
            .unwrap(),
        "svc-backup"
    );

    std::env::remove_var("FILEHUB_ENDPOINT");
    std::env::remove_var("FILEHUB_API_KEY");
}
