//! Email sending and lifecycle endpoints (`/v2/emails`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiResponse, Client},
    errors::{Error, Result},
    http::{require_id, ApiRequest, QueryParams},
    rate_limit::RateLimitInfo,
    types::CursorPaginatedResponse,
};

/// File attached to an outgoing email, inline (`content`) or by `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub filename: String,
    /// Base64-encoded file content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub content_type: String,
}

/// Request body for `POST /v2/emails`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Template ID to render instead of `html`/`text`.
    #[serde(rename = "template", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<EmailAttachment>>,
    /// ISO 8601 send time for scheduled delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl SendEmailRequest {
    pub fn new(from: impl Into<String>, to: Vec<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    pub fn with_scheduled_at(mut self, scheduled_at: impl Into<String>) -> Self {
        self.scheduled_at = Some(scheduled_at.into());
        self
    }
}

/// Request body for rescheduling a queued email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateScheduledEmailRequest {
    pub scheduled_at: String,
}

/// Filters for `GET /v2/emails`. Empty filters are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEmailsRequest {
    pub limit: u32,
    /// Cursor returned as `next_cursor` by the previous page.
    pub after: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
}

impl Default for ListEmailsRequest {
    fn default() -> Self {
        Self {
            limit: 25,
            after: None,
            status: None,
            tag: None,
            from: None,
            to: None,
            subject: None,
            created_after: None,
            created_before: None,
        }
    }
}

impl ListEmailsRequest {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push("limit", self.limit);
        query.push_non_empty("after", self.after.as_deref());
        query.push_non_empty("status", self.status.as_deref());
        query.push_non_empty("tag", self.tag.as_deref());
        query.push_non_empty("from", self.from.as_deref());
        query.push_non_empty("to", self.to.as_deref());
        query.push_non_empty("subject", self.subject.as_deref());
        query.push_non_empty("created_after", self.created_after.as_deref());
        query.push_non_empty("created_before", self.created_before.as_deref());
        query
    }
}

/// An email as reported by the API.
///
/// `rate_limit` is never on the wire: the executor fills it with the snapshot
/// observed on the response that produced this value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Email {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounced_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub rate_limit: Option<RateLimitInfo>,
}

impl ApiResponse for Email {
    fn attach_rate_limit(&mut self, rate_limit: RateLimitInfo) {
        self.rate_limit = Some(rate_limit);
    }
}

/// Response of `POST /v2/emails/{id}/cancel`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CancelEmailResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    #[serde(default)]
    pub cancelled: bool,
}

impl ApiResponse for CancelEmailResponse {}

/// Client for email operations.
#[derive(Clone, Debug)]
pub struct EmailsClient {
    pub(crate) client: Client,
}

impl EmailsClient {
    /// Send an email.
    pub async fn send(&self, req: &SendEmailRequest) -> Result<Email> {
        self.send_inner(req, None).await
    }

    /// Send an email, letting the API deduplicate retries that reuse `idempotency_key`.
    ///
    /// A blank key is ignored.
    pub async fn send_with_idempotency_key(
        &self,
        req: &SendEmailRequest,
        idempotency_key: &str,
    ) -> Result<Email> {
        self.send_inner(req, Some(idempotency_key)).await
    }

    async fn send_inner(
        &self,
        req: &SendEmailRequest,
        idempotency_key: Option<&str>,
    ) -> Result<Email> {
        let request = ApiRequest::post(&["emails"])
            .json(req)?
            .idempotency_key(idempotency_key);
        self.client.execute(request).await
    }

    pub async fn get(&self, email_id: &str) -> Result<Email> {
        let email_id = require_id("email_id", email_id)?;
        self.client
            .execute(ApiRequest::get(&["emails", email_id]))
            .await
    }

    /// Reschedule a scheduled email.
    pub async fn update_scheduled(
        &self,
        email_id: &str,
        req: &UpdateScheduledEmailRequest,
    ) -> Result<Email> {
        let email_id = require_id("email_id", email_id)?;
        let request = ApiRequest::post(&["emails", email_id]).json(req)?;
        self.client.execute(request).await
    }

    /// Cancel a scheduled email.
    ///
    /// Best-effort: an API or transport failure (for example, the email has
    /// already been sent) yields `Ok(false)`. Only [`Error::Cancelled`] and a
    /// blank `email_id` are returned as errors.
    pub async fn cancel(&self, email_id: &str) -> Result<bool> {
        let email_id = require_id("email_id", email_id)?;
        let result: Result<CancelEmailResponse> = self
            .client
            .execute(ApiRequest::post(&["emails", email_id, "cancel"]))
            .await;
        match result {
            Ok(resp) => Ok(resp.cancelled),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(_) => Ok(false),
        }
    }

    /// List emails, newest first, with cursor pagination.
    pub async fn list(&self, req: &ListEmailsRequest) -> Result<CursorPaginatedResponse<Email>> {
        let request = ApiRequest::get(&["emails"]).query(req.to_query());
        self.client.execute(request).await
    }

    pub async fn resend(&self, email_id: &str) -> Result<Email> {
        let email_id = require_id("email_id", email_id)?;
        self.client
            .execute(ApiRequest::post(&["emails", email_id, "resend"]))
            .await
    }
}
