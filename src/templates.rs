//! Email template management (`/v2/templates`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiResponse, Client},
    errors::Result,
    http::{require_id, ApiRequest},
    types::{DeleteResponse, PageParams, PaginatedResponse},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiResponse for Template {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateTemplateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Client for template operations.
#[derive(Clone, Debug)]
pub struct TemplatesClient {
    pub(crate) client: Client,
}

impl TemplatesClient {
    pub async fn create(&self, req: &CreateTemplateRequest) -> Result<Template> {
        let request = ApiRequest::post(&["templates"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get(&self, template_id: &str) -> Result<Template> {
        let template_id = require_id("template_id", template_id)?;
        self.client
            .execute(ApiRequest::get(&["templates", template_id]))
            .await
    }

    pub async fn list(&self, page: PageParams) -> Result<PaginatedResponse<Template>> {
        let request = ApiRequest::get(&["templates"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn update(&self, template_id: &str, req: &UpdateTemplateRequest) -> Result<Template> {
        let template_id = require_id("template_id", template_id)?;
        let request = ApiRequest::post(&["templates", template_id]).json(req)?;
        self.client.execute(request).await
    }

    /// Publish the current draft as a new template version.
    pub async fn publish(&self, template_id: &str) -> Result<Template> {
        let template_id = require_id("template_id", template_id)?;
        self.client
            .execute(ApiRequest::post(&["templates", template_id, "publish"]))
            .await
    }

    pub async fn delete(&self, template_id: &str) -> Result<DeleteResponse> {
        let template_id = require_id("template_id", template_id)?;
        self.client
            .execute(ApiRequest::delete(&["templates", template_id]))
            .await
    }
}
