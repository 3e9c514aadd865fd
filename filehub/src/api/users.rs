//! User API

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub site_admin: Option<bool>,
    pub disabled: Option<bool>,
    pub authentication_method: Option<String>,
    pub group_ids: Option<Vec<i64>>,
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<i64>>,
}

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /users
    pub async fn list(&self, params: &ListParams) -> Result<Page<User>, ApiError> {
        self.client
            .get_page("/users", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<User>, ApiError> {
        let mut users = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            users.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(users),
            }
        }
    }

    /// GET /users/{id}
    pub async fn find(&self, id: i64) -> Result<User, ApiError> {
        self.client.get(&format!("/users/{}", id)).await
    }

    /// POST /users
    pub async fn create(&self, request: &CreateUserRequest) -> Result<User, ApiError> {
        self.client.post("/users", request).await
    }

    /// PATCH /users/{id}
    pub async fn update(&self, id: i64, request: &UpdateUserRequest) -> Result<User, ApiError> {
        self.client.patch(&format!("/users/{}", id), request).await
    }

    /// DELETE /users/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/users/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::CURSOR_HEADER;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn find_returns_the_user() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/42")
            .with_body(
                r#"{"id":42,"username":"jdoe","email":"jdoe@example.com","site_admin":false,
                    "group_ids":[3,9],"created_at":"2026-01-12T08:30:00Z"}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let user = client.users().find(42).await.unwrap();

        assert_eq!(user.id, 42);
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.group_ids.as_deref(), Some(&[3, 9][..]));
    }

    #[tokio::test]
    async fn create_omits_unset_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/users")
            .match_body(Matcher::Json(serde_json::json!({
                "username": "jdoe",
                "email": "jdoe@example.com"
            })))
            .with_body(r#"{"id":42,"username":"jdoe","email":"jdoe@example.com"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let user = client
            .users()
            .create(&CreateUserRequest {
                username: "jdoe".to_string(),
                email: Some("jdoe@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(user.id, 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_all_follows_cursors() {
        let mut server = Server::new_async().await;
        let _first = server
            .mock("GET", "/users")
            .with_header(CURSOR_HEADER, "page2")
            .with_body(r#"[{"id":1,"username":"a"}]"#)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/users")
            .match_query(Matcher::UrlEncoded("cursor".into(), "page2".into()))
            .with_body(r#"[{"id":2,"username":"b"}]"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let users = client.users().list_all().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "b");
    }

    #[tokio::test]
    async fn delete_hits_the_user_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/users/42")
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        client.users().delete(42).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn find_maps_missing_user_to_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/42")
            .with_status(404)
            .with_body(r#"{"error":"Not Found","http_code":404}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let err = client.users().find(42).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
