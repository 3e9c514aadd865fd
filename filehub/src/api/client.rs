use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiErrorDetails, ApiErrorResponse, ApiQueryParams, Page, CURSOR_HEADER};
use super::error::ApiError;

const API_KEY_HEADER: &str = "X-FileHub-Api-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// FileHub API client
///
/// Cheap to clone; the HTTP connection pool, endpoint, and API key are
/// shared behind an `Arc`. Every call is a single round trip: errors are
/// returned as-is, never retried.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, ApiError> {
        let http = reqwest::ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: endpoint.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
            }),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .inner
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET a list endpoint, returning one page and the cursor to the next.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ApiQueryParams,
    ) -> Result<Page<T>, ApiError> {
        let url = format!("{}{}{}", self.inner.base_url, path, query.to_query_string());
        tracing::debug!("GET {}", url);

        let response = self
            .inner
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;

        let next_cursor = response
            .headers()
            .get(CURSOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string());

        let items = Self::parse_response(response).await?;

        Ok(Page { items, next_cursor })
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .inner
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("PATCH {}", url);

        let response = self
            .inner
            .http
            .patch(&url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("DELETE {}", url);

        let response = self
            .inner
            .http
            .delete(&url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthFailed);
        }

        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!("API error response (HTTP {}): {}", status, text);
            let details = serde_json::from_str::<ApiErrorResponse>(&text)
                .ok()
                .map(|body| Box::new(ApiErrorDetails { errors: body.errors }));
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: text,
                details,
            });
        }

        // Delete and some update endpoints answer with an empty body.
        let body = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(body).map_err(|e| {
            tracing::error!("failed to deserialize response: {}, body: {}", e, text);
            ApiError::Parse(format!("failed to parse response: {}", e))
        })
    }

    /// User operations
    pub fn users(&self) -> super::users::UsersApi<'_> {
        super::users::UsersApi::new(self)
    }

    /// Group operations
    pub fn groups(&self) -> super::groups::GroupsApi<'_> {
        super::groups::GroupsApi::new(self)
    }

    /// Group membership operations
    pub fn group_users(&self) -> super::group_users::GroupUsersApi<'_> {
        super::group_users::GroupUsersApi::new(self)
    }

    /// Remote server operations
    pub fn remote_servers(&self) -> super::remote_servers::RemoteServersApi<'_> {
        super::remote_servers::RemoteServersApi::new(self)
    }

    /// Automation operations
    pub fn automations(&self) -> super::automations::AutomationsApi<'_> {
        super::automations::AutomationsApi::new(self)
    }

    /// Behavior operations
    pub fn behaviors(&self) -> super::behaviors::BehaviorsApi<'_> {
        super::behaviors::BehaviorsApi::new(self)
    }

    /// Sync operations
    pub fn syncs(&self) -> super::syncs::SyncsApi<'_> {
        super::syncs::SyncsApi::new(self)
    }

    /// AS2 station operations
    pub fn as2_stations(&self) -> super::as2_stations::As2StationsApi<'_> {
        super::as2_stations::As2StationsApi::new(self)
    }

    /// AS2 partner operations
    pub fn as2_partners(&self) -> super::as2_partners::As2PartnersApi<'_> {
        super::as2_partners::As2PartnersApi::new(self)
    }

    /// Share group operations
    pub fn share_groups(&self) -> super::share_groups::ShareGroupsApi<'_> {
        super::share_groups::ShareGroupsApi::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        ok: bool,
    }

    #[tokio::test]
    async fn client_sends_api_key_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/probe")
            .match_header("x-filehub-api-key", "key-123")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key-123").unwrap();
        let probe: Probe = client.get("/probe").await.unwrap();

        assert!(probe.ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/probe")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = Client::new(&format!("{}/", server.url()), "key").unwrap();
        let _: Probe = client.get("/probe").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_objects_map_to_the_not_found_sentinel() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/99")
            .with_status(404)
            .with_body(r#"{"error":"Not Found","http_code":404}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let result: Result<Probe, _> = client.get("/users/99").await;

        let err = result.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_failed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/probe")
            .with_status(401)
            .with_body(r#"{"error":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "bad-key").unwrap();
        let result: Result<Probe, _> = client.get("/probe").await;

        assert!(matches!(result, Err(ApiError::AuthFailed)));
    }

    #[tokio::test]
    async fn other_errors_carry_status_and_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/probe")
            .with_status(422)
            .with_body(r#"{"error":"Unprocessable","errors":["name is taken"]}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let result: Result<Probe, _> = client.get("/probe").await;

        match result {
            Err(ApiError::Api {
                status, details, ..
            }) => {
                assert_eq!(status, 422);
                let details = details.unwrap();
                assert_eq!(details.errors.as_deref(), Some(&["name is taken".to_string()][..]));
            }
            other => panic!("expected ApiError::Api, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn empty_bodies_deserialize_as_unit() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/users/7")
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        client.delete("/users/7").await.unwrap();
    }

    #[tokio::test]
    async fn pages_capture_the_next_cursor_header() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/probe")
            .with_header(CURSOR_HEADER, "next-page-token")
            .with_body(r#"[{"ok":true},{"ok":false}]"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let page: Page<Probe> = client
            .get_page("/probe", &ApiQueryParams::new())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("next-page-token"));
        assert!(page.has_more());
    }
}
