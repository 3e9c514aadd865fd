//! Share group API

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareGroupMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareGroup {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub members: Option<Vec<ShareGroupMember>>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateShareGroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<ShareGroupMember>>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateShareGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<ShareGroupMember>>,
}

pub struct ShareGroupsApi<'a> {
    client: &'a Client,
}

impl<'a> ShareGroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /share_groups
    pub async fn list(&self, params: &ListParams) -> Result<Page<ShareGroup>, ApiError> {
        self.client
            .get_page("/share_groups", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<ShareGroup>, ApiError> {
        let mut share_groups = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            share_groups.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(share_groups),
            }
        }
    }

    /// GET /share_groups/{id}
    pub async fn find(&self, id: i64) -> Result<ShareGroup, ApiError> {
        self.client.get(&format!("/share_groups/{}", id)).await
    }

    /// POST /share_groups
    pub async fn create(&self, request: &CreateShareGroupRequest) -> Result<ShareGroup, ApiError> {
        self.client.post("/share_groups", request).await
    }

    /// PATCH /share_groups/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateShareGroupRequest,
    ) -> Result<ShareGroup, ApiError> {
        self.client
            .patch(&format!("/share_groups/{}", id), request)
            .await
    }

    /// DELETE /share_groups/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/share_groups/{}", id)).await
    }
}
