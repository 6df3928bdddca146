//! Provider API client.
//!
//! Three calls, two trust domains: the user's OAuth access token
//! (`Bearer`) for profile and guild listing, and the application's own
//! bot credential (`Bot`) for membership checks.

use crate::credential::BotCredential;
use crate::error::ProviderError;
use crate::guild::Guild;
use crate::transport::ApiTransport;
use serde_json::Value;

/// Outcome of a membership check against the bot principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCheck {
    /// The bot is a member of the guild.
    Member,
    /// The provider reported the bot absent (404) or unreachable for
    /// the bot principal (403). Expected business outcome, not a fault.
    NotMember,
}

/// Client for the provider's REST API.
pub struct ProviderClient<T> {
    transport: T,
    api_base: String,
    user_agent: String,
}

impl<T: ApiTransport> ProviderClient<T> {
    /// Creates a client over the given transport.
    ///
    /// `api_base` has no trailing slash (e.g. `https://discord.com/api`);
    /// `user_agent` identifies the application to the provider.
    #[must_use]
    pub fn new(transport: T, api_base: impl Into<String>, user_agent: impl Into<String>) -> Self {
        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }
        Self {
            transport,
            api_base,
            user_agent: user_agent.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches the authenticated user's raw profile attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure, a non-2xx
    /// status, or an unparsable body.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Value, ProviderError> {
        let url = format!("{}/users/@me", self.api_base);
        let response = self
            .transport
            .get(&url, &self.bearer_headers(access_token))
            .await?;

        if !response.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| ProviderError::MalformedResponse {
            reason: e.to_string(),
        })
    }

    /// Lists the guilds the authenticated user belongs to.
    ///
    /// Unknown fields in each record are ignored so the provider can
    /// extend the schema without breaking this decoder.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal for the request: no partial guild
    /// list is returned.
    pub async fn list_member_guilds(&self, access_token: &str) -> Result<Vec<Guild>, ProviderError> {
        let url = format!("{}/users/@me/guilds", self.api_base);
        let response = self
            .transport
            .get(&url, &self.bearer_headers(access_token))
            .await?;

        if !response.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| ProviderError::MalformedResponse {
            reason: e.to_string(),
        })
    }

    /// Asks whether the application's own principal is a member of the
    /// guild, using the privileged bot credential.
    ///
    /// 2xx means member; 403/404 mean the bot is not installed there.
    ///
    /// # Errors
    ///
    /// Every other status, and any transport failure, is surfaced as a
    /// [`ProviderError`] for the caller's failure policy to resolve.
    pub async fn check_app_membership(
        &self,
        credential: &BotCredential,
        guild_id: &str,
        app_user_id: &str,
    ) -> Result<MembershipCheck, ProviderError> {
        let url = format!(
            "{}/guilds/{}/members/{}",
            self.api_base, guild_id, app_user_id
        );
        let headers = [
            ("authorization", credential.authorization_value()),
            ("user-agent", self.user_agent.clone()),
        ];
        let response = self.transport.get(&url, &headers).await?;

        if response.is_success() {
            Ok(MembershipCheck::Member)
        } else if response.status == 403 || response.status == 404 {
            Ok(MembershipCheck::NotMember)
        } else {
            Err(ProviderError::UnexpectedStatus {
                status: response.status,
            })
        }
    }

    fn bearer_headers(&self, access_token: &str) -> [(&'static str, String); 2] {
        [
            ("authorization", format!("Bearer {access_token}")),
            ("user-agent", self.user_agent.clone()),
        ]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transport::{ApiResponse, TransportError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned outcome for one URL.
    #[derive(Debug, Clone)]
    pub(crate) enum Canned {
        Respond(u16, String),
        Fail(TransportError),
    }

    /// Transport returning canned responses keyed by URL, recording
    /// every request it sees.
    pub(crate) struct MockTransport {
        responses: HashMap<String, Canned>,
        pub(crate) requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self {
                responses: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), Canned::Respond(status, body.to_string()));
            self
        }

        pub(crate) fn fail(mut self, url: &str, error: TransportError) -> Self {
            self.responses.insert(url.to_string(), Canned::Fail(error));
            self
        }

        pub(crate) fn requested_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("lock")
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ApiTransport for MockTransport {
        async fn get(
            &self,
            url: &str,
            headers: &[(&str, String)],
        ) -> Result<ApiResponse, TransportError> {
            self.requests.lock().expect("lock").push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), v.clone()))
                    .collect(),
            ));
            match self.responses.get(url) {
                Some(Canned::Respond(status, body)) => Ok(ApiResponse {
                    status: *status,
                    body: body.clone(),
                }),
                Some(Canned::Fail(err)) => Err(err.clone()),
                None => Ok(ApiResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }

    const BASE: &str = "https://provider.test/api";

    fn client(transport: MockTransport) -> ProviderClient<MockTransport> {
        ProviderClient::new(transport, BASE, "guildgate (test)")
    }

    fn sent_headers(client: &ProviderClient<MockTransport>) -> Vec<(String, String)> {
        client
            .transport
            .requests
            .lock()
            .expect("lock")
            .first()
            .expect("one request")
            .1
            .clone()
    }

    #[tokio::test]
    async fn list_guilds_sends_bearer_and_user_agent() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/users/@me/guilds",
            200,
            r#"[{"id": "1", "name": "one", "owner": true, "permissions": "0"}]"#,
        );
        let client = client(transport);

        let guilds = client.list_member_guilds("user-token").await.expect("list");
        assert_eq!(guilds.len(), 1);
        assert_eq!(guilds[0].id, "1");

        let headers = sent_headers(&client);
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "authorization" && v == "Bearer user-token")
        );
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "user-agent" && v == "guildgate (test)")
        );
    }

    #[tokio::test]
    async fn list_guilds_non_success_is_fatal() {
        let transport =
            MockTransport::new().respond("https://provider.test/api/users/@me/guilds", 401, "{}");
        let client = client(transport);

        let err = client.list_member_guilds("stale").await.unwrap_err();
        assert_eq!(err, ProviderError::UnexpectedStatus { status: 401 });
    }

    #[tokio::test]
    async fn list_guilds_malformed_body_is_fatal() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/users/@me/guilds",
            200,
            "not json",
        );
        let client = client(transport);

        assert!(matches!(
            client.list_member_guilds("token").await.unwrap_err(),
            ProviderError::MalformedResponse { .. }
        ));
    }

    #[tokio::test]
    async fn membership_check_uses_bot_credential() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/guilds/1/members/app-id",
            200,
            "{}",
        );
        let client = client(transport);
        let credential = BotCredential::new("bot-secret");

        let outcome = client
            .check_app_membership(&credential, "1", "app-id")
            .await
            .expect("check");
        assert_eq!(outcome, MembershipCheck::Member);

        let headers = sent_headers(&client);
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "authorization" && v == "Bot bot-secret")
        );
    }

    #[tokio::test]
    async fn membership_not_found_is_not_member() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/guilds/2/members/app-id",
            404,
            "{}",
        );
        let client = client(transport);

        let outcome = client
            .check_app_membership(&BotCredential::new("x"), "2", "app-id")
            .await
            .expect("check");
        assert_eq!(outcome, MembershipCheck::NotMember);
    }

    #[tokio::test]
    async fn membership_forbidden_is_not_member() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/guilds/3/members/app-id",
            403,
            "{}",
        );
        let client = client(transport);

        let outcome = client
            .check_app_membership(&BotCredential::new("x"), "3", "app-id")
            .await
            .expect("check");
        assert_eq!(outcome, MembershipCheck::NotMember);
    }

    #[tokio::test]
    async fn membership_other_status_is_an_error() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/guilds/4/members/app-id",
            429,
            "{}",
        );
        let client = client(transport);

        let err = client
            .check_app_membership(&BotCredential::new("x"), "4", "app-id")
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::UnexpectedStatus { status: 429 });
    }

    #[tokio::test]
    async fn fetch_profile_parses_attributes() {
        let transport = MockTransport::new().respond(
            "https://provider.test/api/users/@me",
            200,
            r#"{"id": "190405607035", "username": "somebody"}"#,
        );
        let client = client(transport);

        let profile = client.fetch_profile("token").await.expect("profile");
        assert_eq!(profile["id"], "190405607035");
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let client = ProviderClient::new(MockTransport::new(), "https://provider.test/api/", "ua");
        assert_eq!(client.api_base, "https://provider.test/api");
    }
}
