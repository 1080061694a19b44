use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiResponse, Client},
    errors::Result,
    http::{require_id, ApiRequest},
    types::{DeleteResponse, PageParams, PaginatedResponse},
};

/// An API key. `key` is only populated in the response to `create`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sending_domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiResponse for ApiKey {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// `full` or `sending`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Restricts a sending key to one domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sending_domain_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateApiKeyRequest {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct ApiKeysClient {
    pub(crate) client: Client,
}

impl ApiKeysClient {
    pub async fn create(&self, req: &CreateApiKeyRequest) -> Result<ApiKey> {
        let request = ApiRequest::post(&["api-keys"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get(&self, api_key_id: &str) -> Result<ApiKey> {
        let api_key_id = require_id("api_key_id", api_key_id)?;
        self.client
            .execute(ApiRequest::get(&["api-keys", api_key_id]))
            .await
    }

    pub async fn list(&self, page: PageParams) -> Result<PaginatedResponse<ApiKey>> {
        let request = ApiRequest::get(&["api-keys"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn update(&self, api_key_id: &str, req: &UpdateApiKeyRequest) -> Result<ApiKey> {
        let api_key_id = require_id("api_key_id", api_key_id)?;
        let request = ApiRequest::post(&["api-keys", api_key_id]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn delete(&self, api_key_id: &str) -> Result<DeleteResponse> {
        let api_key_id = require_id("api_key_id", api_key_id)?;
        self.client
            .execute(ApiRequest::delete(&["api-keys", api_key_id]))
            .await
    }
}
