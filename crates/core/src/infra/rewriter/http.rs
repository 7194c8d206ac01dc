use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RewriteContext, RewriteError, Rewriter};
use crate::domain::settings::PhraserSettings;
use crate::domain::types::Tone;

/// 言い換えサービス（POST /api/Parapharser）を呼ぶリライター
pub struct HttpParaphraser {
    client: reqwest::Client,
    endpoint: String,
}

/// dialect は送らない
#[derive(Debug, Serialize)]
pub struct ParaphraseRequest<'a> {
    pub tone: Tone,
    pub sentence: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ParaphraseResponse {
    pub result: String,
}

impl HttpParaphraser {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RewriteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RewriteError::NotAvailable(format!("HTTP client init failed: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_settings(settings: &PhraserSettings) -> Result<Self, RewriteError> {
        Self::new(
            settings.endpoint(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Rewriter for HttpParaphraser {
    async fn rewrite(
        &self,
        text: &str,
        ctx: RewriteContext,
    ) -> Result<String, RewriteError> {
        let request = ParaphraseRequest {
            tone: ctx.tone,
            sentence: text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RewriteError::Timeout
                } else {
                    RewriteError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RewriteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RewriteError::Timeout
            } else {
                RewriteError::Transport(format!("Body read failed: {e}"))
            }
        })?;

        let parsed: ParaphraseResponse = serde_json::from_str(&body)
            .map_err(|e| RewriteError::MalformedResponse(e.to_string()))?;

        Ok(parsed.result)
    }

    fn name(&self) -> &str {
        "http"
    }
}
