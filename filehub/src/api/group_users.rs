//! Group membership API
//!
//! Memberships have their own server-assigned ID, but the natural key is
//! (group_id, user_id); reads filter the listing by group and match on the
//! user.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ApiQueryParams, ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct GroupUser {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub admin: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateGroupUserRequest {
    pub group_id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateGroupUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListGroupUsersParams {
    pub group_id: Option<i64>,
    pub user_id: Option<i64>,
    pub page: ListParams,
}

impl ListGroupUsersParams {
    fn to_query_params(&self) -> ApiQueryParams {
        let mut query = self.page.to_query_params();
        query = query.add_optional("group_id", self.group_id);
        query.add_optional("user_id", self.user_id)
    }
}

pub struct GroupUsersApi<'a> {
    client: &'a Client,
}

impl<'a> GroupUsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /group_users
    pub async fn list(&self, params: &ListGroupUsersParams) -> Result<Page<GroupUser>, ApiError> {
        self.client
            .get_page("/group_users", &params.to_query_params())
            .await
    }

    /// Locate one membership by its natural key, following cursors.
    pub async fn find_by_pair(&self, group_id: i64, user_id: i64) -> Result<GroupUser, ApiError> {
        let mut params = ListGroupUsersParams {
            group_id: Some(group_id),
            ..Default::default()
        };

        loop {
            let page = self.list(&params).await?;
            if let Some(membership) = page.items.into_iter().find(|m| m.user_id == user_id) {
                return Ok(membership);
            }
            match page.next_cursor {
                Some(cursor) => params.page.cursor = Some(cursor),
                None => return Err(ApiError::NotFound),
            }
        }
    }

    /// POST /group_users
    pub async fn create(&self, request: &CreateGroupUserRequest) -> Result<GroupUser, ApiError> {
        self.client.post("/group_users", request).await
    }

    /// PATCH /group_users/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateGroupUserRequest,
    ) -> Result<GroupUser, ApiError> {
        self.client
            .patch(&format!("/group_users/{}", id), request)
            .await
    }

    /// DELETE /group_users/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/group_users/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::CURSOR_HEADER;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn find_by_pair_filters_by_group_and_matches_user() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/group_users")
            .match_query(Matcher::UrlEncoded("group_id".into(), "17".into()))
            .with_body(
                r#"[{"id":300,"group_id":17,"user_id":5,"admin":false},
                    {"id":301,"group_id":17,"user_id":93,"admin":true}]"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let membership = client.group_users().find_by_pair(17, 93).await.unwrap();

        assert_eq!(membership.id, 301);
        assert_eq!(membership.admin, Some(true));
    }

    #[tokio::test]
    async fn find_by_pair_follows_cursors_before_giving_up() {
        let mut server = Server::new_async().await;
        let _first = server
            .mock("GET", "/group_users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("group_id".into(), "17".into()),
                Matcher::Missing("cursor".into()),
            ]))
            .with_header(CURSOR_HEADER, "c2")
            .with_body(r#"[{"id":300,"group_id":17,"user_id":5}]"#)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/group_users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("group_id".into(), "17".into()),
                Matcher::UrlEncoded("cursor".into(), "c2".into()),
            ]))
            .with_body(r#"[]"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let err = client.group_users().find_by_pair(17, 93).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
