use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use reelchat_logging::{reel_debug, reel_info, reel_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::extract::extract_video_url;
use crate::payload::{decode_payload, WebhookRequest};
use crate::{Delivery, DispatchError, EndpointFailure, FailureKind};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Tried in order until one answers with a success status.
    pub endpoints: Vec<String>,
    pub connect_timeout: Duration,
    /// Budget for the whole dispatch, across all endpoints.
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_millis(360_000),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[async_trait::async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Posts `text` to the configured endpoints. Cancelling `cancel` aborts
    /// whatever request is in flight.
    async fn dispatch(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Delivery, DispatchError>;
}

pub struct ReqwestDispatcher {
    settings: DispatchSettings,
    clock: Clock,
}

impl ReqwestDispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self {
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for request timestamps and session ids.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn build_client(&self) -> Result<reqwest::Client, DispatchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| DispatchError::ClientSetup(err.to_string()))
    }

    async fn try_endpoints(
        &self,
        client: &reqwest::Client,
        body: &[u8],
    ) -> Result<Delivery, DispatchError> {
        let mut failures = Vec::with_capacity(self.settings.endpoints.len());
        for url in &self.settings.endpoints {
            reel_info!("Posting submission to webhook {}", url);
            match self.post(client, url, body).await {
                Ok(delivery) => {
                    reel_info!(
                        "Webhook {} answered {} (video url: {})",
                        url,
                        delivery.status,
                        delivery.video_url.is_some()
                    );
                    return Ok(delivery);
                }
                Err(failure) => {
                    reel_warn!("Webhook attempt failed: {} ({})", failure, failure.message);
                    failures.push(failure);
                }
            }
        }
        Err(DispatchError::AllEndpointsFailed(failures))
    }

    async fn post(
        &self,
        client: &reqwest::Client,
        url: &str,
        body: &[u8],
    ) -> Result<Delivery, EndpointFailure> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| EndpointFailure::new(url, FailureKind::InvalidUrl, err.to_string()))?;

        let response = client
            .post(parsed)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|err| network_failure(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EndpointFailure::new(
                url,
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(url, max_bytes, content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| network_failure(url, err))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(url, max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        reel_debug!(
            "Webhook {} body: {} bytes, content type {:?}",
            url,
            bytes.len(),
            content_type
        );

        let text = String::from_utf8_lossy(&bytes);
        let payload = decode_payload(&text, content_type.as_deref());
        let video_url = extract_video_url(&payload);

        Ok(Delivery {
            endpoint: url.to_string(),
            status: status.as_u16(),
            payload,
            video_url,
        })
    }
}

#[async_trait::async_trait]
impl WebhookDispatcher for ReqwestDispatcher {
    async fn dispatch(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Delivery, DispatchError> {
        if self.settings.endpoints.is_empty() {
            return Err(DispatchError::NoEndpoints);
        }
        let client = self.build_client()?;
        let request = WebhookRequest::new(text, (self.clock)());
        let body = serde_json::to_vec(&request)
            .map_err(|err| DispatchError::ClientSetup(err.to_string()))?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                reel_info!("Webhook dispatch cancelled");
                Err(DispatchError::Cancelled)
            }
            _ = tokio::time::sleep(self.settings.request_timeout) => {
                reel_warn!(
                    "Webhook dispatch timed out after {:?}",
                    self.settings.request_timeout
                );
                Err(DispatchError::Timeout)
            }
            result = self.try_endpoints(&client, &body) => result,
        }
    }
}

fn network_failure(url: &str, err: reqwest::Error) -> EndpointFailure {
    EndpointFailure::new(url, FailureKind::Network, err.to_string())
}

fn too_large(url: &str, max_bytes: u64, actual: u64) -> EndpointFailure {
    EndpointFailure::new(
        url,
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}
