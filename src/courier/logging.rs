//! A courier that delivers notifications to the application log.
//!
//! This serves as a basic courier to validate the dispatch pipeline and can be
//! used for debugging purposes.

use crate::core::{Courier, Notification};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, instrument};

/// The channel name the log courier opts notifications into.
pub const LOG_CHANNEL: &str = "log";

/// Logs every notification of the kinds it is routed to.
#[derive(Debug, Default, Clone)]
pub struct LogCourier;

#[async_trait]
impl Courier for LogCourier {
    fn name(&self) -> &str {
        "log"
    }

    fn channel(&self) -> &str {
        LOG_CHANNEL
    }

    async fn prepare(&self, notification: &mut Notification) -> Result<()> {
        notification.opt_in(LOG_CHANNEL);
        Ok(())
    }

    #[instrument(skip_all, fields(id = ?notification.id))]
    async fn deliver(&self, notification: &mut Notification) -> Result<()> {
        info!(
            receiver = %notification.receiver,
            sender = ?notification.sender.as_ref().map(ToString::to_string),
            notifiable = %notification.notifiable,
            target = ?notification.target.as_ref().map(ToString::to_string),
            "Delivered notification via log courier"
        );
        notification.mark_processed(LOG_CHANNEL);
        Ok(())
    }
}
