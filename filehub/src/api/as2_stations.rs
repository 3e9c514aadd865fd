//! AS2 station API
//!
//! A station is this site's AS2 endpoint. The URI is assigned server-side;
//! the private key is write-only.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct As2Station {
    pub id: i64,
    pub name: String,
    pub uri: Option<String>,
    pub public_certificate: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateAs2StationRequest {
    pub name: String,
    pub public_certificate: String,
    pub private_key: String,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateAs2StationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

pub struct As2StationsApi<'a> {
    client: &'a Client,
}

impl<'a> As2StationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /as2_stations
    pub async fn list(&self, params: &ListParams) -> Result<Page<As2Station>, ApiError> {
        self.client
            .get_page("/as2_stations", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<As2Station>, ApiError> {
        let mut stations = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            stations.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(stations),
            }
        }
    }

    /// GET /as2_stations/{id}
    pub async fn find(&self, id: i64) -> Result<As2Station, ApiError> {
        self.client.get(&format!("/as2_stations/{}", id)).await
    }

    /// POST /as2_stations
    pub async fn create(&self, request: &CreateAs2StationRequest) -> Result<As2Station, ApiError> {
        self.client.post("/as2_stations", request).await
    }

    /// PATCH /as2_stations/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateAs2StationRequest,
    ) -> Result<As2Station, ApiError> {
        self.client
            .patch(&format!("/as2_stations/{}", id), request)
            .await
    }

    /// DELETE /as2_stations/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/as2_stations/{}", id)).await
    }
}
