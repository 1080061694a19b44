//! Rust SDK for the Emailit transactional email API.
//!
//! Every endpoint goes through one request executor that injects bearer auth,
//! captures the rate-limit headers of each response, and classifies HTTP
//! failures into [`ApiError`]. [`ClientFactory`] caches one [`Client`] per API
//! key for multi-tenant deployments.
//!
//! ```no_run
//! use emailit::{Client, Config, SendEmailRequest};
//!
//! # async fn run() -> emailit::Result<()> {
//! let client = Client::new(Config::new("em_live_key"))?;
//! let email = client
//!     .emails()
//!     .send(&SendEmailRequest::new(
//!         "sender@example.com",
//!         vec!["recipient@example.com".into()],
//!         "Hello",
//!     ).with_html("<p>Hi there</p>"))
//!     .await?;
//! println!("{} is {}", email.id, email.status);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.emailit.com";

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Default User-Agent header value.
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("emailit-rust/", env!("CARGO_PKG_VERSION"));

/// First path segment of every endpoint.
pub(crate) const API_VERSION_SEGMENT: &str = "v2";

/// Request header used by the API to deduplicate retried sends.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

pub const RATE_LIMIT_LIMIT_HEADER: &str = "ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "ratelimit-remaining";
pub const RATE_LIMIT_DAILY_LIMIT_HEADER: &str = "ratelimit-daily-limit";
pub const RATE_LIMIT_DAILY_REMAINING_HEADER: &str = "ratelimit-daily-remaining";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

mod api_keys;
mod audiences;
mod client;
mod domains;
mod emails;
mod errors;
mod factory;
mod http;
mod rate_limit;
mod suppressions;
mod templates;
pub mod testing;
mod types;
mod verifications;

pub use api_keys::{ApiKey, ApiKeysClient, CreateApiKeyRequest, UpdateApiKeyRequest};
pub use audiences::{
    AddSubscriberRequest, Audience, AudiencesClient, CreateAudienceRequest, Subscriber,
    UpdateAudienceRequest, UpdateSubscriberRequest,
};
pub use client::{Client, Config};
pub use domains::{CreateDomainRequest, DnsRecord, Domain, DomainsClient, UpdateDomainRequest};
pub use emails::{
    CancelEmailResponse, Email, EmailAttachment, EmailsClient, ListEmailsRequest,
    SendEmailRequest, UpdateScheduledEmailRequest,
};
pub use errors::{
    ApiError, Error, FieldErrors, Result, TransportError, TransportErrorKind, SERVER_ERROR_PREFIX,
};
pub use factory::ClientFactory;
pub use http::{classify_error, ErrorEnvelope};
pub use rate_limit::{time_until_daily_reset, RateLimitInfo};
pub use suppressions::{
    CreateSuppressionRequest, Suppression, SuppressionsClient, UpdateSuppressionRequest,
};
pub use templates::{CreateTemplateRequest, Template, TemplatesClient, UpdateTemplateRequest};
pub use types::{CursorPaginatedResponse, DeleteResponse, PageParams, PaginatedResponse};
pub use verifications::{
    CreateVerificationListRequest, EmailVerification, VerificationList,
    VerificationListResults, VerificationsClient, VerifyEmailRequest,
};

pub use tokio_util::sync::CancellationToken;
