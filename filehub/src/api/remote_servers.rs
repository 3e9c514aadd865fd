//! Remote server API
//!
//! Credentials (password, private key) are write-only: they appear in
//! create/update requests and are never echoed back by the API.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteServer {
    pub id: i64,
    pub name: String,
    pub server_type: String,
    pub hostname: Option<String>,
    pub port: Option<i64>,
    pub username: Option<String>,
    pub max_connections: Option<i64>,
    pub disabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateRemoteServerRequest {
    pub name: String,
    pub server_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateRemoteServerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

pub struct RemoteServersApi<'a> {
    client: &'a Client,
}

impl<'a> RemoteServersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /remote_servers
    pub async fn list(&self, params: &ListParams) -> Result<Page<RemoteServer>, ApiError> {
        self.client
            .get_page("/remote_servers", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<RemoteServer>, ApiError> {
        let mut servers = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            servers.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(servers),
            }
        }
    }

    /// GET /remote_servers/{id}
    pub async fn find(&self, id: i64) -> Result<RemoteServer, ApiError> {
        self.client.get(&format!("/remote_servers/{}", id)).await
    }

    /// POST /remote_servers
    pub async fn create(
        &self,
        request: &CreateRemoteServerRequest,
    ) -> Result<RemoteServer, ApiError> {
        self.client.post("/remote_servers", request).await
    }

    /// PATCH /remote_servers/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateRemoteServerRequest,
    ) -> Result<RemoteServer, ApiError> {
        self.client
            .patch(&format!("/remote_servers/{}", id), request)
            .await
    }

    /// DELETE /remote_servers/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/remote_servers/{}", id)).await
    }
}
