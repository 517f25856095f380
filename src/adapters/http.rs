use crate::core::retry::{self, Deadline, RetryPolicy};
use crate::core::{EventSink, FetchUsersClient, PushUsersClient, User};
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;

/// GET client for the user source. Every call runs under the retry policy;
/// a non-2xx status, an empty body, or a decode failure counts as a failed
/// attempt.
#[derive(Clone)]
pub struct HttpFetchClient {
    url: String,
    policy: RetryPolicy,
    client: Client,
    events: Arc<dyn EventSink>,
}

impl HttpFetchClient {
    pub fn new(
        url: impl Into<String>,
        policy: RetryPolicy,
        client: Client,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            url: url.into(),
            policy,
            client,
            events,
        }
    }
}

#[async_trait]
impl FetchUsersClient for HttpFetchClient {
    async fn fetch_users(&self, deadline: Deadline) -> Result<Vec<User>> {
        retry::run(&self.policy, deadline, self.events.as_ref(), || async move {
            tracing::debug!(url = %self.url, "Making fetch request");
            let response = self
                .client
                .get(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await?;

            let status = response.status();
            tracing::debug!(%status, "Fetch response status");
            if !status.is_success() {
                return Err(DispatchError::UnexpectedStatus { status });
            }

            let body = response.bytes().await?;
            if body.is_empty() {
                return Err(DispatchError::EmptyBody);
            }

            let users: Vec<User> = serde_json::from_slice(&body)?;
            self.events.users_fetched(users.len());
            Ok(users)
        })
        .await
    }
}

/// POST client for the user sink. The payload is serialized once and resent
/// verbatim on every attempt; a confirmed non-empty response body is the only
/// success signal, its content is not validated.
#[derive(Clone)]
pub struct HttpPushClient {
    url: String,
    policy: RetryPolicy,
    client: Client,
    events: Arc<dyn EventSink>,
}

impl HttpPushClient {
    pub fn new(
        url: impl Into<String>,
        policy: RetryPolicy,
        client: Client,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            url: url.into(),
            policy,
            client,
            events,
        }
    }
}

#[async_trait]
impl PushUsersClient for HttpPushClient {
    async fn push_users(&self, users: &[User], deadline: Deadline) -> Result<()> {
        let payload = serde_json::to_vec(users)?;

        retry::run(&self.policy, deadline, self.events.as_ref(), || {
            // The serialized payload is resent verbatim on every attempt.
            let body = payload.clone();
            async move {
                tracing::debug!(url = %self.url, bytes = body.len(), "Making push request");
                let response = self
                    .client
                    .post(&self.url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
                    .send()
                    .await?;

                let status = response.status();
                tracing::debug!(%status, "Push response status");
                if !status.is_success() {
                    return Err(DispatchError::UnexpectedStatus { status });
                }

                let reply = response.bytes().await?;
                if reply.is_empty() {
                    return Err(DispatchError::EmptyBody);
                }

                Ok(())
            }
        })
        .await?;

        self.events.users_pushed(users.len());
        Ok(())
    }
}
