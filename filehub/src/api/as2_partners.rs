//! AS2 partner API
//!
//! A partner belongs to exactly one station for its whole life; there is no
//! `as2_station_id` in the update request.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{ListParams, Page};
use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct As2Partner {
    pub id: i64,
    pub name: String,
    pub as2_station_id: i64,
    pub uri: Option<String>,
    pub public_certificate: Option<String>,
    pub mdn_validation_level: Option<String>,
    pub enable_dedicated_ips: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateAs2PartnerRequest {
    pub name: String,
    pub as2_station_id: i64,
    pub uri: String,
    pub public_certificate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdn_validation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dedicated_ips: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateAs2PartnerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdn_validation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dedicated_ips: Option<bool>,
}

pub struct As2PartnersApi<'a> {
    client: &'a Client,
}

impl<'a> As2PartnersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /as2_partners
    pub async fn list(&self, params: &ListParams) -> Result<Page<As2Partner>, ApiError> {
        self.client
            .get_page("/as2_partners", &params.to_query_params())
            .await
    }

    /// Follow cursors until the listing is exhausted.
    pub async fn list_all(&self) -> Result<Vec<As2Partner>, ApiError> {
        let mut partners = Vec::new();
        let mut params = ListParams::new();

        loop {
            let page = self.list(&params).await?;
            partners.extend(page.items);
            match page.next_cursor {
                Some(cursor) => params.cursor = Some(cursor),
                None => return Ok(partners),
            }
        }
    }

    /// GET /as2_partners/{id}
    pub async fn find(&self, id: i64) -> Result<As2Partner, ApiError> {
        self.client.get(&format!("/as2_partners/{}", id)).await
    }

    /// POST /as2_partners
    pub async fn create(&self, request: &CreateAs2PartnerRequest) -> Result<As2Partner, ApiError> {
        self.client.post("/as2_partners", request).await
    }

    /// PATCH /as2_partners/{id}
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateAs2PartnerRequest,
    ) -> Result<As2Partner, ApiError> {
        self.client
            .patch(&format!("/as2_partners/{}", id), request)
            .await
    }

    /// DELETE /as2_partners/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/as2_partners/{}", id)).await
    }
}
