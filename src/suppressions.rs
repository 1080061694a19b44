use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiResponse, Client},
    errors::Result,
    http::{require_id, ApiRequest},
    types::{DeleteResponse, PageParams, PaginatedResponse},
};

/// An address the API will refuse to send to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Suppression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub email: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub suppression_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiResponse for Suppression {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateSuppressionRequest {
    pub email: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub suppression_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSuppressionRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub suppression_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SuppressionsClient {
    pub(crate) client: Client,
}

impl SuppressionsClient {
    pub async fn create(&self, req: &CreateSuppressionRequest) -> Result<Suppression> {
        let request = ApiRequest::post(&["suppressions"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get(&self, suppression_id: &str) -> Result<Suppression> {
        let suppression_id = require_id("suppression_id", suppression_id)?;
        self.client
            .execute(ApiRequest::get(&["suppressions", suppression_id]))
            .await
    }

    pub async fn list(&self, page: PageParams) -> Result<PaginatedResponse<Suppression>> {
        let request = ApiRequest::get(&["suppressions"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn update(
        &self,
        suppression_id: &str,
        req: &UpdateSuppressionRequest,
    ) -> Result<Suppression> {
        let suppression_id = require_id("suppression_id", suppression_id)?;
        let request = ApiRequest::post(&["suppressions", suppression_id]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn delete(&self, suppression_id: &str) -> Result<DeleteResponse> {
        let suppression_id = require_id("suppression_id", suppression_id)?;
        self.client
            .execute(ApiRequest::delete(&["suppressions", suppression_id]))
            .await
    }
}
