//! Common types and utilities for the FileHub API

use serde::Deserialize;

/// Response header carrying the cursor for the next page, when one exists.
pub const CURSOR_HEADER: &str = "X-FileHub-Cursor-Next";

/// Structured error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: Option<String>,
    pub http_code: Option<u16>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: {errors:?}")]
pub struct ApiErrorDetails {
    pub errors: Option<Vec<String>>,
}

/// One page of a list endpoint plus the cursor to the next.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Cursor and page-size parameters shared by every list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub cursor: Option<String>,
    pub per_page: Option<u32>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn to_query_params(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional("cursor", self.cursor.as_ref())
            .add_optional("per_page", self.per_page)
    }
}

/// Query string builder; values are percent-encoded.
#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_encode_values() {
        let params = ApiQueryParams::new()
            .add("path", "reports/2026 Q1")
            .add_optional("cursor", Some("abc"))
            .add_optional::<_, u32>("per_page", None);

        assert_eq!(
            params.to_query_string(),
            "?path=reports%2F2026%20Q1&cursor=abc"
        );
    }

    #[test]
    fn empty_query_params_render_nothing() {
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }

    #[test]
    fn list_params_build_cursor_query() {
        let params = ListParams::new().with_cursor("xyz").with_per_page(50);
        assert_eq!(
            params.to_query_params().to_query_string(),
            "?cursor=xyz&per_page=50"
        );
    }
}
