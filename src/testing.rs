//! Helpers for exercising the client against a local mock server.

use crate::{
    Client, ClientFactory, Config, RATE_LIMIT_DAILY_LIMIT_HEADER,
    RATE_LIMIT_DAILY_REMAINING_HEADER, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
};

/// API key used by [`test_client`].
pub const TEST_API_KEY: &str = "em_test_key";

/// Create a test client configured to use a wiremock server.
pub fn test_client(base_url: &str) -> Client {
    test_client_with_key(base_url, TEST_API_KEY)
}

/// Create a test client with a specific API key.
pub fn test_client_with_key(base_url: &str, api_key: &str) -> Client {
    Client::new(Config::new(api_key).with_base_url(base_url)).expect("client")
}

/// Create a factory whose clients all point at `base_url`.
pub fn test_factory(base_url: &str) -> ClientFactory {
    ClientFactory::new(Config::default().with_base_url(base_url)).expect("factory")
}

/// Rate-limit response headers, ready to feed to a mock response.
pub fn rate_limit_headers(
    limit: i64,
    remaining: i64,
    daily_limit: i64,
    daily_remaining: i64,
) -> Vec<(&'static str, String)> {
    vec![
        (RATE_LIMIT_LIMIT_HEADER, limit.to_string()),
        (RATE_LIMIT_REMAINING_HEADER, remaining.to_string()),
        (RATE_LIMIT_DAILY_LIMIT_HEADER, daily_limit.to_string()),
        (RATE_LIMIT_DAILY_REMAINING_HEADER, daily_remaining.to_string()),
    ]
}
