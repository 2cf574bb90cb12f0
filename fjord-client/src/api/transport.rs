// HTTP transport for the feedback and trigger-rule APIs.
//
// The traits exist so the submission flow can be exercised deterministically with stubs;
// production code uses `HttpTransport` (reqwest). No retries: one user action, one request.

use crate::models::requests::FeedbackPayload;
use crate::models::responses::FeedbackResponse;
use crate::models::settings::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

/// Transport failures. Cloneable so they can cross the UI message channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("server returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[async_trait]
pub trait FeedbackTransport: Send + Sync {
    async fn post_feedback(
        &self,
        payload: &FeedbackPayload,
    ) -> Result<FeedbackResponse, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    pub(crate) feedback_url: url::Url,
    pub(crate) trigger_match_url: url::Url,
}

impl HttpTransport {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            feedback_url: settings.endpoint(&settings.feedback_path)?,
            trigger_match_url: settings.endpoint(&settings.trigger_match_path)?,
        })
    }

    pub(crate) async fn post_json<B, R>(&self, url: &url::Url, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned + Send,
    {
        let span = tracing::info_span!("post_json", url = %url);
        async {
            let resp = self
                .client
                .post(url.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .json(body)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                warn!(
                    "[PHASE: api] [STEP: post] {} answered HTTP {}",
                    url,
                    status.as_u16()
                );
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed = resp.json::<R>().await?;
            info!("[PHASE: api] [STEP: post] {} answered HTTP {}", url, status.as_u16());
            Ok(parsed)
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl FeedbackTransport for HttpTransport {
    async fn post_feedback(
        &self,
        payload: &FeedbackPayload,
    ) -> Result<FeedbackResponse, TransportError> {
        self.post_json(&self.feedback_url, payload).await
    }
}
