//! A courier that pushes notifications to an HTTP webhook.

use crate::config::PushConfig;
use crate::core::{Courier, Notification, ParticipantRef};
use crate::formatting::TextFormatter;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::task;
use tracing::{debug, error, info, instrument};

/// Pushes eligible notifications to a webhook as JSON.
pub struct PushCourier {
    config: PushConfig,
    formatter: Box<dyn TextFormatter>,
    timeout: Duration,
}

impl PushCourier {
    /// Creates a new `PushCourier`.
    pub fn new(config: PushConfig, formatter: Box<dyn TextFormatter>) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        Self {
            config,
            formatter,
            timeout,
        }
    }

    /// Whether notifications for `receiver` should be pushed at all.
    fn accepts(&self, receiver: &ParticipantRef) -> bool {
        self.config.receiver_kinds.is_empty()
            || self
                .config
                .receiver_kinds
                .iter()
                .any(|kind| *kind == receiver.kind)
    }

    fn payload(&self, notification: &Notification) -> Value {
        json!({
            "id": notification.id,
            "sender": notification.sender,
            "receiver": notification.receiver,
            "notifiable": notification.notifiable,
            "target": notification.target,
            "text": self.formatter.format(notification),
        })
    }

    /// Sends the request in a blocking manner.
    fn send_request(
        client: reqwest::blocking::Client,
        webhook_url: &str,
        payload: &Value,
    ) -> Result<()> {
        let response = client.post(webhook_url).json(payload).send();

        match response {
            Ok(res) => {
                if res.status().is_success() {
                    Ok(())
                } else {
                    let status = res.status();
                    let text = res.text().unwrap_or_default();
                    error!(
                        status = %status,
                        body = %text,
                        "Push webhook rejected notification"
                    );
                    anyhow::bail!(
                        "Push webhook rejected notification: status {}, body: {}",
                        status,
                        text
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "HTTP request to push webhook failed");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl Courier for PushCourier {
    fn name(&self) -> &str {
        "push"
    }

    fn channel(&self) -> &str {
        &self.config.channel
    }

    async fn prepare(&self, notification: &mut Notification) -> Result<()> {
        if self.accepts(&notification.receiver) {
            notification.opt_in(&self.config.channel);
        } else {
            notification.opt_out(&self.config.channel);
        }
        Ok(())
    }

    /// Posts the notification to the configured webhook and marks the channel
    /// processed. Ineligible notifications are skipped.
    #[instrument(skip_all, fields(id = ?notification.id, receiver = %notification.receiver))]
    async fn deliver(&self, notification: &mut Notification) -> Result<()> {
        if !notification.is_eligible(&self.config.channel) {
            debug!("Notification not eligible for push, skipping.");
            return Ok(());
        }

        let payload = self.payload(notification);
        let webhook_url = self.config.webhook_url.clone();
        let timeout = self.timeout;
        let result = task::spawn_blocking(move || {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()?;
            Self::send_request(client, &webhook_url, &payload)
        })
        .await;

        match result {
            Ok(Ok(())) => {
                notification.mark_processed(&self.config.channel);
                info!("Pushed notification to webhook.");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(e) => {
                error!(error = %e, "Push delivery task failed");
                Err(e.into())
            }
        }
    }
}
