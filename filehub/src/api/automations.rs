//! Automation API
//!
//! `custom_schedule` is free-form JSON (days/times shaped by the automation
//! type); it travels as `serde_json::Value` and is bridged into the typed
//! attribute tree by the resource layer.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Automation {
    pub id: i64,
    pub automation_type: String,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub path: Option<String>,
    pub interval: Option<String>,
    pub custom_schedule: Option<serde_json::Value>,
    pub user_id: Option<i64>,
    pub disabled: Option<bool>,
    pub last_run_at: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateAutomationRequest {
    pub automation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_schedule: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateAutomationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_schedule: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

pub struct AutomationsApi<'a> {
    client: &'a Client,
}

impl<'a> AutomationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /automations
    pub async fn list(&self, params: &ListParams) -> Result<Page<Automation>, ApiError> {
        self.client
            .get_page("/automations", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<Automation>, ApiError> {
        let mut automations = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            automations.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(automations),
            }
        }
    }

    /// GET /automations/{id}
    pub async fn find(&self, id: i64) -> Result<Automation, ApiError> {
        self.client.get(&format!("/automations/{}", id)).await
    }

    /// POST /automations
    pub async fn create(&self, request: &CreateAutomationRequest) -> Result<Automation, ApiError> {
        self.client.post("/automations", request).await
    }

    /// PATCH /automations/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateAutomationRequest,
    ) -> Result<Automation, ApiError> {
        self.client
            .patch(&format!("/automations/{}", id), request)
            .await
    }

    /// DELETE /automations/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/automations/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn custom_schedule_round_trips_as_json() {
        let mut server = Server::new_async().await;
        let schedule = serde_json::json!({"days": [1, 3, 5], "times": ["06:30"]});
        let mock = server
            .mock("POST", "/automations")
            .match_body(Matcher::Json(serde_json::json!({
                "automation_type": "copy_file",
                "source": "/incoming",
                "destination": "/archive",
                "custom_schedule": {"days": [1, 3, 5], "times": ["06:30"]}
            })))
            .with_body(
                r#"{"id":11,"automation_type":"copy_file","source":"/incoming",
                    "destination":"/archive","custom_schedule":{"days":[1,3,5],"times":["06:30"]}}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let automation = client
            .automations()
            .create(&CreateAutomationRequest {
                automation_type: "copy_file".to_string(),
                source: Some("/incoming".to_string()),
                destination: Some("/archive".to_string()),
                custom_schedule: Some(schedule.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(automation.custom_schedule, Some(schedule));
        mock.assert_async().await;
    }
}
