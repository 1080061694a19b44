//! Audiences and their subscribers (`/v2/audiences`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    client::{ApiResponse, Client},
    errors::Result,
    http::{require_id, ApiRequest},
    types::{DeleteResponse, PageParams, PaginatedResponse},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Audience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub name: String,
    /// Public token used by subscription forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub subscriber_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiResponse for Audience {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAudienceRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateAudienceRequest {
    pub name: String,
}

/// A contact subscribed to an audience.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Subscriber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_fields: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiResponse for Subscriber {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddSubscriberRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<HashMap<String, Value>>,
}

impl AddSubscriberRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSubscriberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<HashMap<String, Value>>,
}

/// Client for audience and subscriber operations.
#[derive(Clone, Debug)]
pub struct AudiencesClient {
    pub(crate) client: Client,
}

impl AudiencesClient {
    pub async fn create(&self, req: &CreateAudienceRequest) -> Result<Audience> {
        let request = ApiRequest::post(&["audiences"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get(&self, audience_id: &str) -> Result<Audience> {
        let audience_id = require_id("audience_id", audience_id)?;
        self.client
            .execute(ApiRequest::get(&["audiences", audience_id]))
            .await
    }

    pub async fn list(&self, page: PageParams) -> Result<PaginatedResponse<Audience>> {
        let request = ApiRequest::get(&["audiences"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn update(&self, audience_id: &str, req: &UpdateAudienceRequest) -> Result<Audience> {
        let audience_id = require_id("audience_id", audience_id)?;
        let request = ApiRequest::post(&["audiences", audience_id]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn delete(&self, audience_id: &str) -> Result<DeleteResponse> {
        let audience_id = require_id("audience_id", audience_id)?;
        self.client
            .execute(ApiRequest::delete(&["audiences", audience_id]))
            .await
    }

    pub async fn add_subscriber(
        &self,
        audience_id: &str,
        req: &AddSubscriberRequest,
    ) -> Result<Subscriber> {
        let audience_id = require_id("audience_id", audience_id)?;
        let request = ApiRequest::post(&["audiences", audience_id, "subscribers"]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn get_subscriber(&self, audience_id: &str, subscriber_id: &str) -> Result<Subscriber> {
        let audience_id = require_id("audience_id", audience_id)?;
        let subscriber_id = require_id("subscriber_id", subscriber_id)?;
        self.client
            .execute(ApiRequest::get(&[
                "audiences",
                audience_id,
                "subscribers",
                subscriber_id,
            ]))
            .await
    }

    pub async fn list_subscribers(
        &self,
        audience_id: &str,
        page: PageParams,
    ) -> Result<PaginatedResponse<Subscriber>> {
        let audience_id = require_id("audience_id", audience_id)?;
        let request =
            ApiRequest::get(&["audiences", audience_id, "subscribers"]).query(page.to_query());
        self.client.execute(request).await
    }

    pub async fn update_subscriber(
        &self,
        audience_id: &str,
        subscriber_id: &str,
        req: &UpdateSubscriberRequest,
    ) -> Result<Subscriber> {
        let audience_id = require_id("audience_id", audience_id)?;
        let subscriber_id = require_id("subscriber_id", subscriber_id)?;
        let request =
            ApiRequest::post(&["audiences", audience_id, "subscribers", subscriber_id]).json(req)?;
        self.client.execute(request).await
    }

    pub async fn delete_subscriber(
        &self,
        audience_id: &str,
        subscriber_id: &str,
    ) -> Result<DeleteResponse> {
        let audience_id = require_id("audience_id", audience_id)?;
        let subscriber_id = require_id("subscriber_id", subscriber_id)?;
        self.client
            .execute(ApiRequest::delete(&[
                "audiences",
                audience_id,
                "subscribers",
                subscriber_id,
            ]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscriber_custom_fields_default_to_empty() {
        let sub: Subscriber = serde_json::from_value(json!({
            "id": "sub_1",
            "email": "a@example.com",
            "status": "subscribed"
        }))
        .unwrap();
        assert!(sub.custom_fields.is_empty());
        assert_eq!(sub.status.as_deref(), Some("subscribed"));
    }

    #[test]
    fn add_subscriber_sends_only_set_fields() {
        let mut req = AddSubscriberRequest::new("a@example.com");
        req.custom_fields = Some(HashMap::from([("plan".to_string(), json!("pro"))]));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"email": "a@example.com", "custom_fields": {"plan": "pro"}})
        );
    }
}
