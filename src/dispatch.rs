//! Notification dispatch.
//!
//! A [`Dispatcher`] turns one notifiable event into one persisted, delivered
//! notification per distinct receiver, skipping a receiver that is also the
//! event's sender.

use crate::core::{Notifiable, Notification, NotificationStore, Participant, ParticipantRef};
use crate::courier::CourierPipeline;
use crate::error::DispatchError;
use crate::resolver::{interpret, Descriptors, Resolved, Role};
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What a notification callback did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// No receiver was resolved; nothing ran.
    NothingToNotify,
    /// Dispatch ran and persisted these notifications (possibly none).
    Dispatched(Vec<Notification>),
}

impl DispatchOutcome {
    pub fn notifications(&self) -> &[Notification] {
        match self {
            DispatchOutcome::NothingToNotify => &[],
            DispatchOutcome::Dispatched(notifications) => notifications,
        }
    }
}

/// Dispatches notifications for instances of one notifiable type.
pub struct Dispatcher<T: Notifiable> {
    descriptors: Descriptors<T>,
    pipeline: CourierPipeline,
    store: Arc<dyn NotificationStore>,
}

impl<T: Notifiable> Dispatcher<T> {
    /// Creates a dispatcher using the descriptors `T` declares.
    pub fn new(pipeline: CourierPipeline, store: Arc<dyn NotificationStore>) -> Self {
        Self::with_descriptors(Descriptors::of(), pipeline, store)
    }

    /// Creates a dispatcher with explicit descriptors, e.g. ones bound from
    /// configuration.
    pub fn with_descriptors(
        descriptors: Descriptors<T>,
        pipeline: CourierPipeline,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        debug!(kind = T::kind(), ?descriptors, "Registered notifiable type");
        Self {
            descriptors,
            pipeline,
            store,
        }
    }

    pub fn descriptors(&self) -> &Descriptors<T> {
        &self.descriptors
    }

    pub fn notice_receiver(&self, instance: &T) -> Result<Resolved, DispatchError> {
        Ok(interpret(
            Role::Receiver,
            &self.descriptors.receiver,
            instance,
        )?)
    }

    /// Resolves the sender; `None` when the type declares none or it
    /// resolves to nothing.
    pub fn notice_sender(&self, instance: &T) -> Result<Option<ParticipantRef>, DispatchError> {
        self.notice_single(Role::Sender, instance)
    }

    /// Resolves the target with the same absence tolerance as the sender.
    pub fn notice_target(&self, instance: &T) -> Result<Option<ParticipantRef>, DispatchError> {
        self.notice_single(Role::Target, instance)
    }

    fn notice_single(
        &self,
        role: Role,
        instance: &T,
    ) -> Result<Option<ParticipantRef>, DispatchError> {
        let resolved = interpret(role, self.descriptors.get(role), instance)?;
        Ok(resolved.into_single(role)?)
    }

    /// Entry point for a notifiable event.
    ///
    /// Returns [`DispatchOutcome::NothingToNotify`] when no receiver resolves,
    /// otherwise runs [`Dispatcher::notify`].
    #[instrument(skip_all, fields(kind = T::kind(), notifiable = %instance.participant_ref()))]
    pub async fn notification_callback(
        &self,
        instance: &T,
    ) -> Result<DispatchOutcome, DispatchError> {
        if self.notice_receiver(instance)?.is_absent() {
            debug!("No receiver resolved, nothing to notify");
            return Ok(DispatchOutcome::NothingToNotify);
        }
        let notifications = self.notify(instance).await?;
        info!(count = notifications.len(), "Dispatched notifications");
        Ok(DispatchOutcome::Dispatched(notifications))
    }

    /// Notifies every distinct resolved receiver, in resolution order.
    pub async fn notify(&self, instance: &T) -> Result<Vec<Notification>, DispatchError> {
        let receivers = self.notice_receiver(instance)?.into_vec();
        let mut notifications = Vec::with_capacity(receivers.len());
        for receiver in receivers.into_iter().unique() {
            if let Some(notification) = self.notify_one(instance, receiver).await? {
                notifications.push(notification);
            }
        }
        Ok(notifications)
    }

    /// Creates the notification for one receiver, unless the receiver is the
    /// resolved sender.
    pub async fn notify_one(
        &self,
        instance: &T,
        receiver: ParticipantRef,
    ) -> Result<Option<Notification>, DispatchError> {
        let sender = self.notice_sender(instance)?;
        if sender.as_ref() == Some(&receiver) {
            metrics::counter!("notifications_suppressed_total").increment(1);
            debug!(%receiver, "Receiver is the sender, skipping");
            return Ok(None);
        }

        let notification = Notification::new(instance.participant_ref(), receiver)
            .with_sender(sender)
            .with_target(self.notice_target(instance)?);

        let saved = create_notification(&self.pipeline, self.store.as_ref(), notification).await?;
        Ok(Some(saved))
    }
}

/// Persists `notification` with the courier lifecycle around the write:
/// `prepare`, insert, `deliver`, then the courier-updated flags are written
/// back.
///
/// A `prepare` failure means nothing is persisted. A `deliver` failure still
/// writes back the flags of the couriers that finished, so the failed channel
/// is the one left unprocessed; the courier error wins over a store error.
pub async fn create_notification(
    pipeline: &CourierPipeline,
    store: &dyn NotificationStore,
    mut notification: Notification,
) -> Result<Notification, DispatchError> {
    pipeline.prepare(&mut notification).await?;
    let mut saved = store.insert(notification).await?;
    metrics::counter!("notifications_created_total").increment(1);
    let delivered = pipeline.deliver(&mut saved).await;
    let updated = store.update(&saved).await;
    delivered?;
    updated?;
    Ok(saved)
}
