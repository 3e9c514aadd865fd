//! Group API

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub user_ids: Option<Vec<i64>>,
    pub admin_ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_ids: Option<Vec<i64>>,
}

pub struct GroupsApi<'a> {
    client: &'a Client,
}

impl<'a> GroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /groups
    pub async fn list(&self, params: &ListParams) -> Result<Page<Group>, ApiError> {
        self.client
            .get_page("/groups", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<Group>, ApiError> {
        let mut groups = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            groups.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(groups),
            }
        }
    }

    /// GET /groups/{id}
    pub async fn find(&self, id: i64) -> Result<Group, ApiError> {
        self.client.get(&format!("/groups/{}", id)).await
    }

    /// POST /groups
    pub async fn create(&self, request: &CreateGroupRequest) -> Result<Group, ApiError> {
        self.client.post("/groups", request).await
    }

    /// PATCH /groups/{id}
    pub async fn update(&self, id: i64, request: &UpdateGroupRequest) -> Result<Group, ApiError> {
        self.client.patch(&format!("/groups/{}", id), request).await
    }

    /// DELETE /groups/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/groups/{}", id)).await
    }
}
