//! Sending domain management (`/v2/domains`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiResponse, Client},
    errors::Result,
    http::{require_id, ApiRequest},
    types::{DeleteResponse, PageParams, PaginatedResponse},
};

/// DNS record the domain owner must publish.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_records: Option<Vec<DnsRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiResponse for Domain {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDomainRequest {
    pub name: String,
    pub from_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateDomainRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
}

/// Client for sending domain operations.
#[derive(Clone, Debug)]
pub struct DomainsClient {
    pub(crate) client: Client,
}

impl DomainsClient {
    pub async fn create(&self, req: &CreateDomainRequest) -> Result<Domain> {
        let request = ApiRequest::post(&["domains"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get(&self, domain_id: &str) -> Result<Domain> {
        let domain_id = require_id("domain_id", domain_id)?;
        self.client
            .execute(ApiRequest::get(&["domains", domain_id]))
            .await
    }

    pub async fn list(&self, page: PageParams) -> Result<PaginatedResponse<Domain>> {
        let request = ApiRequest::get(&["domains"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn update(&self, domain_id: &str, req: &UpdateDomainRequest) -> Result<Domain> {
        let domain_id = require_id("domain_id", domain_id)?;
        let request = ApiRequest::post(&["domains", domain_id]).json(req)?;
        self.client.execute(request).await
    }

    /// Re-check the domain's DNS records.
    pub async fn verify(&self, domain_id: &str) -> Result<Domain> {
        let domain_id = require_id("domain_id", domain_id)?;
        self.client
            .execute(ApiRequest::post(&["domains", domain_id, "verify"]))
            .await
    }

    pub async fn delete(&self, domain_id: &str) -> Result<DeleteResponse> {
        let domain_id = require_id("domain_id", domain_id)?;
        self.client
            .execute(ApiRequest::delete(&["domains", domain_id]))
            .await
    }
}
