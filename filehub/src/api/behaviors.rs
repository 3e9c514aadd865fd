//! Behavior API
//!
//! A behavior attaches a setting to a folder path; `value` is free-form
//! JSON whose shape depends on the behavior kind.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ApiQueryParams, ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Behavior {
    pub id: i64,
    pub path: String,
    pub behavior: String,
    pub value: Option<serde_json::Value>,
    pub disabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateBehaviorRequest {
    pub path: String,
    pub behavior: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateBehaviorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListBehaviorsParams {
    pub path: Option<String>,
    pub behavior: Option<String>,
    pub page: ListParams,
}

impl ListBehaviorsParams {
    fn to_query_params(&self) -> ApiQueryParams {
        let mut query = self.page.to_query_params();
        query = query.add_optional("path", self.path.as_ref());
        query.add_optional("behavior", self.behavior.as_ref())
    }
}

pub struct BehaviorsApi<'a> {
    client: &'a Client,
}

impl<'a> BehaviorsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /behaviors
    pub async fn list(&self, params: &ListBehaviorsParams) -> Result<Page<Behavior>, ApiError> {
        self.client
            .get_page("/behaviors", &params.to_query_params())
            .await
    }

    /// Follow cursors until the filtered listing is exhausted.
    pub async fn list_all(&self, params: &ListBehaviorsParams) -> Result<Vec<Behavior>, ApiError> {
        let mut behaviors = Vec::new();
        let mut params = params.clone();

        loop {
            let page = self.list(&params).await?;
            behaviors.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.page.cursor = Some(cursor),
                None => return Ok(behaviors),
            }
        }
    }

    /// GET /behaviors/{id}
    pub async fn find(&self, id: i64) -> Result<Behavior, ApiError> {
        self.client.get(&format!("/behaviors/{}", id)).await
    }

    /// POST /behaviors
    pub async fn create(&self, request: &CreateBehaviorRequest) -> Result<Behavior, ApiError> {
        self.client.post("/behaviors", request).await
    }

    /// PATCH /behaviors/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateBehaviorRequest,
    ) -> Result<Behavior, ApiError> {
        self.client
            .patch(&format!("/behaviors/{}", id), request)
            .await
    }

    /// DELETE /behaviors/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/behaviors/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn behavior_value_is_arbitrary_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/behaviors/8")
            .with_body(
                r#"{"id":8,"path":"uploads","behavior":"webhook",
                    "value":{"urls":["https://hooks.example.com/f"],"method":"POST"}}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let behavior = client.behaviors().find(8).await.unwrap();

        assert_eq!(behavior.behavior, "webhook");
        let value = behavior.value.unwrap();
        assert_eq!(value["method"], "POST");
    }

    #[tokio::test]
    async fn list_filters_by_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/behaviors")
            .match_query(Matcher::UrlEncoded("path".into(), "uploads".into()))
            .with_body(r#"[{"id":8,"path":"uploads","behavior":"webhook"}]"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let page = client
            .behaviors()
            .list(&ListBehaviorsParams {
                path: Some("uploads".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more());
        mock.assert_async().await;
    }
}
