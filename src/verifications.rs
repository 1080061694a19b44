//! Email verification, single-address and bulk lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiResponse, Client},
    errors::Result,
    http::{require_id, ApiRequest},
    types::{PageParams, PaginatedResponse},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEmailRequest {
    pub email: String,
}

/// Outcome of verifying one address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmailVerification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub email: String,
    /// `valid`, `invalid`, `risky` or `unknown`.
    pub result: String,
    /// 0 (safest) to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deliverable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disposable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_role_account: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free_provider: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_mx_records: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl ApiResponse for EmailVerification {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateVerificationListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Up to 100,000 addresses.
    pub emails: Vec<String>,
}

/// A bulk verification job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `pending`, `processing`, `completed` or `failed`.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risky_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl VerificationList {
    pub fn is_complete(&self) -> bool {
        self.status == "completed"
    }
}

impl ApiResponse for VerificationList {}

/// One page of per-address results for a verification list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationListResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default)]
    pub list_id: String,
    #[serde(default)]
    pub data: Vec<EmailVerification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_page_url: Option<String>,
}

impl ApiResponse for VerificationListResults {}

/// Client for email verification operations.
#[derive(Clone, Debug)]
pub struct VerificationsClient {
    pub(crate) client: Client,
}

impl VerificationsClient {
    pub async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<EmailVerification> {
        let request = ApiRequest::post(&["email-verifications"]).json(req)?;
        self.client.execute(request).await
    }

    /// Start a bulk verification job.
    pub async fn create_list(&self, req: &CreateVerificationListRequest) -> Result<VerificationList> {
        let request = ApiRequest::post(&["email-verification-lists"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get_list(&self, list_id: &str) -> Result<VerificationList> {
        let list_id = require_id("list_id", list_id)?;
        self.client
            .execute(ApiRequest::get(&["email-verification-lists", list_id]))
            .await
    }

    pub async fn list_lists(&self, page: PageParams) -> Result<PaginatedResponse<VerificationList>> {
        let request = ApiRequest::get(&["email-verification-lists"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn results(&self, list_id: &str, page: PageParams) -> Result<VerificationListResults> {
        let list_id = require_id("list_id", list_id)?;
        let request = ApiRequest::get(&["email-verification-lists", list_id, "results"])
            .query(page.to_query());
        self.client.execute(request).await
    }

    /// Export a list's results as XLSX.
    ///
    /// Returns the download URL the export endpoint resolved to, after redirects.
    pub async fn export_results(&self, list_id: &str) -> Result<String> {
        let list_id = require_id("list_id", list_id)?;
        let raw = self
            .client
            .send(ApiRequest::get(&["email-verification-lists", list_id, "export"]))
            .await?;
        Ok(raw.url.to_string())
    }
}
