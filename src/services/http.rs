//! reqwest-backed `ResourceApi`

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::decode::wire::{WireEvent, WireNode};
use crate::error::RemoteActionError;
use crate::services::api::{ResourceAction, ResourceApi};

pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("API URL cannot be used as a base: {}", api_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created HTTP backend for: {}", base);

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL, escaping each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API URL cannot be used as a base: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        tracing::debug!("GET {}", url);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch from: {}", url))?;

        if !resp.status().is_success() {
            anyhow::bail!("HTTP request failed: {} (status: {})", url, resp.status());
        }
        Ok(resp)
    }
}

#[async_trait]
impl ResourceApi for HttpBackend {
    async fn fetch_tree(&self) -> Result<WireNode> {
        let resp = self.get(self.endpoint(&["api", "tree"])?).await?;
        resp.json().await.context("Failed to parse tree response")
    }

    async fn fetch_events(&self) -> Result<Vec<WireEvent>> {
        let resp = self.get(self.endpoint(&["api", "events"])?).await?;
        let events: Option<Vec<WireEvent>> =
            resp.json().await.context("Failed to parse events response")?;
        Ok(events.unwrap_or_default())
    }

    async fn describe(&self, uid: &str) -> Result<String> {
        let resp = self
            .get(self.endpoint(&["api", "resource", uid, "describe"])?)
            .await?;
        resp.text().await.context("Failed to read describe response")
    }

    async fn perform(&self, action: ResourceAction, uid: &str) -> Result<(), RemoteActionError> {
        let transport = |message: String| RemoteActionError::Transport {
            action: action.as_str(),
            uid: uid.to_string(),
            message,
        };

        let url = self
            .endpoint(&["api", "resource", uid, action.as_str()])
            .map_err(|e| transport(e.to_string()))?;
        tracing::debug!("PATCH {}", url);

        let resp = self
            .client
            .patch(url)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteActionError::Http {
                action: action.as_str(),
                uid: uid.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::info!("Requested {} for {}", action, uid);
        Ok(())
    }
}
