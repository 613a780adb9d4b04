//! YouTube channel subscription check.

use async_trait::async_trait;
use gatehouse_core::{AccessToken, Provider, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::checker::EntitlementChecker;
use crate::error::EntitlementError;

/// Production YouTube Data API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Subset of the `subscriptions.list` response we care about.
#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Checks whether the token's owner is subscribed to a fixed channel.
#[derive(Debug, Clone)]
pub struct YouTubeSubscriptionChecker {
    http: reqwest::Client,
    api_base_url: String,
    channel_id: String,
}

impl YouTubeSubscriptionChecker {
    /// Creates a checker for `channel_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel ID is blank.
    pub fn new(
        http: reqwest::Client,
        api_base_url: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Result<Self, EntitlementError> {
        let channel_id = channel_id.into();
        if channel_id.trim().is_empty() {
            return Err(EntitlementError::Configuration {
                reason: "YouTube channel ID is empty".to_string(),
            }
            .into());
        }
        Ok(Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            channel_id,
        })
    }

    /// Returns the configured target channel.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Lists the visitor's subscriptions filtered to the configured channel.
    ///
    /// The visitor is subscribed iff the filtered list is non-empty.
    #[instrument(skip_all, fields(channel_id = %self.channel_id))]
    pub async fn check_subscription(
        &self,
        access_token: &AccessToken,
    ) -> Result<bool, EntitlementError> {
        let url = format!("{}/subscriptions", self.api_base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token.secret())
            .query(&[
                ("part", "snippet"),
                ("forChannelId", self.channel_id.as_str()),
                ("mine", "true"),
                ("maxResults", "1"),
            ])
            .send()
            .await
            .map_err(|e| EntitlementError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EntitlementError::UnexpectedStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body: SubscriptionListResponse =
            response
                .json()
                .await
                .map_err(|e| EntitlementError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        let subscribed = !body.items.is_empty();
        debug!(subscribed, "subscription check result");
        Ok(subscribed)
    }
}

#[async_trait]
impl EntitlementChecker for YouTubeSubscriptionChecker {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn check(&self, access_token: &AccessToken) -> Result<bool, EntitlementError> {
        self.check_subscription(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::http_client;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHANNEL: &str = "UC_target_channel";

    fn checker(server: &MockServer) -> YouTubeSubscriptionChecker {
        YouTubeSubscriptionChecker::new(http_client().expect("client"), server.uri(), CHANNEL)
            .expect("checker")
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    fn token() -> AccessToken {
        AccessToken::new("ya29.test")
    }

    #[tokio::test]
    async fn one_item_means_subscribed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .and(query_param("forChannelId", CHANNEL))
            .and(query_param("mine", "true"))
            .and(query_param("part", "snippet"))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "youtube#subscriptionListResponse",
                "items": [{ "id": "sub-1", "snippet": { "title": "Target" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let subscribed = checker(&server).check(&token()).await.expect("check");
        assert!(subscribed);
    }

    #[tokio::test]
    async fn empty_list_means_not_subscribed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })),
            )
            .mount(&server)
            .await;

        let subscribed = checker(&server).check(&token()).await.expect("check");
        assert!(!subscribed);
    }

    #[tokio::test]
    async fn missing_items_field_means_not_subscribed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "pageInfo": { "totalResults": 0 } })),
            )
            .mount(&server)
            .await;

        let subscribed = checker(&server).check(&token()).await.expect("check");
        assert!(!subscribed);
    }

    #[tokio::test]
    async fn repeated_checks_agree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "items": [{ "id": "sub-1" }] })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let checker = checker(&server);
        let first = checker.check_subscription(&token()).await.expect("first");
        let second = checker.check_subscription(&token()).await.expect("second");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "code": 401, "message": "Invalid Credentials" }
            })))
            .mount(&server)
            .await;

        assert!(checker(&server).check(&token()).await.is_err());
    }

    #[tokio::test]
    async fn undecodable_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        assert!(checker(&server).check(&token()).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_api_is_reported() {
        let checker = YouTubeSubscriptionChecker::new(
            http_client().expect("client"),
            closed_port_url(),
            CHANNEL,
        )
        .expect("checker");
        assert!(checker.check(&token()).await.is_err());
    }

    #[tokio::test]
    async fn subscription_check_filters_on_configured_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .and(query_param("forChannelId", "UC_other"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let checker =
            YouTubeSubscriptionChecker::new(http_client().expect("client"), server.uri(), "UC_other")
                .expect("checker");
        assert_eq!(checker.channel_id(), "UC_other");
        assert!(!checker.check_subscription(&token()).await.expect("check"));
    }

    #[test]
    fn blank_channel_is_rejected() {
        let result =
            YouTubeSubscriptionChecker::new(http_client().expect("client"), DEFAULT_API_BASE_URL, " ");
        assert!(result.is_err());
    }
}
