//! Notification sinks for accepted alerts

use crate::error::{DetectorError, Result};
use crate::models::signal::AlertEvent;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Delivers one alert to one destination. Callers never retry.
#[async_trait]
pub trait NotificationSink {
    async fn send(&self, destination: &str, alert: &AlertEvent) -> Result<()>;
}

/// Writes alerts to the structured log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send(&self, destination: &str, alert: &AlertEvent) -> Result<()> {
        let timeframes = alert
            .timeframes
            .iter()
            .map(|tf| tf.label())
            .collect::<Vec<_>>()
            .join(",");
        let snapshot = serde_json::to_string(&alert.snapshot).unwrap_or_default();
        info!(
            destination = %destination,
            symbol = %alert.symbol,
            kind = %alert.kind,
            timeframes = %timeframes,
            bar = %alert.bar_timestamp,
            snapshot = %snapshot,
            "ALERT {} {} [{}] bar {}",
            alert.symbol,
            alert.kind,
            timeframes,
            alert.bar_timestamp
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    destination: &'a str,
    alert: &'a AlertEvent,
}

/// POSTs `{destination, alert}` as JSON to a fixed URL.
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DetectorError::configuration(format!("http client: {}", e)))?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn send(&self, destination: &str, alert: &AlertEvent) -> Result<()> {
        let delivery_error = |message: String| DetectorError::NotificationDelivery {
            destination: destination.to_string(),
            message,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { destination, alert })
            .send()
            .await
            .map_err(|e| delivery_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(delivery_error(format!("webhook returned HTTP {}", status)));
        }
        Ok(())
    }
}
