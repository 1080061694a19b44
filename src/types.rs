use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{client::ApiResponse, http::QueryParams};

/// Page-numbered list parameters. `page` and `limit` are always sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 100 }
    }
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub(crate) fn to_query(self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push("page", self.page);
        query.push("limit", self.limit);
        query
    }
}

/// Page-numbered list response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_page_url: Option<String>,
}

impl<T> PaginatedResponse<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_page_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn has_previous_page(&self) -> bool {
        self.previous_page_url
            .as_deref()
            .is_some_and(|u| !u.is_empty())
    }
}

impl<T: DeserializeOwned> ApiResponse for PaginatedResponse<T> {}

/// Cursor-paginated list response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct CursorPaginatedResponse<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T: DeserializeOwned> ApiResponse for CursorPaginatedResponse<T> {}

/// Acknowledgement returned by every delete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

impl ApiResponse for DeleteResponse {}
