//! Sync API

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Sync {
    pub id: i64,
    pub name: String,
    pub sync_type: String,
    pub src_path: Option<String>,
    pub dest_path: Option<String>,
    pub remote_server_id: Option<i64>,
    pub interval: Option<String>,
    pub disabled: Option<bool>,
    pub last_synced_at: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateSyncRequest {
    pub name: String,
    pub sync_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_server_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateSyncRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_server_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

pub struct SyncsApi<'a> {
    client: &'a Client,
}

impl<'a> SyncsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /syncs
    pub async fn list(&self, params: &ListParams) -> Result<Page<Sync>, ApiError> {
        self.client
            .get_page("/syncs", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<Sync>, ApiError> {
        let mut syncs = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            syncs.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(syncs),
            }
        }
    }

    /// GET /syncs/{id}
    pub async fn find(&self, id: i64) -> Result<Sync, ApiError> {
        self.client.get(&format!("/syncs/{}", id)).await
    }

    /// POST /syncs
    pub async fn create(&self, request: &CreateSyncRequest) -> Result<Sync, ApiError> {
        self.client.post("/syncs", request).await
    }

    /// PATCH /syncs/{id}
    pub async fn update(&self, id: i64, request: &UpdateSyncRequest) -> Result<Sync, ApiError> {
        self.client.patch(&format!("/syncs/{}", id), request).await
    }

    /// DELETE /syncs/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/syncs/{}", id)).await
    }
}
