//! Core domain types and service traits for notifiable
//!
//! This module defines the notification record, the polymorphic participant
//! reference, and the trait contracts that connect notifiable types, couriers
//! and storage.

use crate::resolver::Descriptor;
use crate::store::StoreError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage-assigned identity of a persisted notification.
pub type NotificationId = u64;

/// An opaque reference to any participant: a type tag plus an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantRef {
    /// Type tag (e.g., "user", "thread")
    pub kind: String,
    /// Identifier, unique within `kind`
    pub id: String,
}

impl ParticipantRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ParticipantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A value that can take part in a notification as sender, receiver, target
/// or subject.
///
/// Two participants are the same participant when their references are equal,
/// so each type decides what equality means by choosing its identifier.
pub trait Participant {
    fn participant_ref(&self) -> ParticipantRef;
}

impl Participant for ParticipantRef {
    fn participant_ref(&self) -> ParticipantRef {
        self.clone()
    }
}

/// Per-channel delivery state carried on a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelFlags {
    /// Whether the notification should go out on this channel
    pub eligible: bool,
    /// Whether the channel has finished processing the notification
    pub processed: bool,
}

/// The delivery record produced for one receiver of one notifiable event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Assigned by storage on insert
    pub id: Option<NotificationId>,
    pub sender: Option<ParticipantRef>,
    pub receiver: ParticipantRef,
    /// The subject that triggered the notification
    pub notifiable: ParticipantRef,
    pub target: Option<ParticipantRef>,
    /// Delivery flags keyed by channel name
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelFlags>,
    /// Assigned by storage on insert
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Creates an unpersisted notification about `notifiable` for `receiver`.
    pub fn new(notifiable: ParticipantRef, receiver: ParticipantRef) -> Self {
        Self {
            id: None,
            sender: None,
            receiver,
            notifiable,
            target: None,
            channels: BTreeMap::new(),
            created_at: None,
        }
    }

    pub fn with_sender(mut self, sender: Option<ParticipantRef>) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_target(mut self, target: Option<ParticipantRef>) -> Self {
        self.target = target;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Marks the notification as eligible for `channel`.
    pub fn opt_in(&mut self, channel: &str) {
        self.channels.entry(channel.to_string()).or_default().eligible = true;
    }

    /// Marks the notification as not eligible for `channel`.
    pub fn opt_out(&mut self, channel: &str) {
        self.channels.entry(channel.to_string()).or_default().eligible = false;
    }

    /// Records that `channel` has finished with this notification.
    pub fn mark_processed(&mut self, channel: &str) {
        self.channels.entry(channel.to_string()).or_default().processed = true;
    }

    pub fn is_eligible(&self, channel: &str) -> bool {
        self.channels.get(channel).is_some_and(|flags| flags.eligible)
    }

    pub fn is_processed(&self, channel: &str) -> bool {
        self.channels.get(channel).is_some_and(|flags| flags.processed)
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// A type whose instances produce notifications about themselves.
///
/// The three descriptors are read once per type, when a
/// [`Dispatcher`](crate::dispatch::Dispatcher) is constructed, not per event.
pub trait Notifiable: Participant + Send + Sync + Sized + 'static {
    /// Type tag used to look up the couriers registered for this type.
    fn kind() -> &'static str;

    /// How to resolve who receives the notification.
    fn receiver() -> Descriptor<Self>;

    /// How to resolve who the notification is from.
    fn sender() -> Descriptor<Self>;

    /// How to resolve the secondary object carried for couriers.
    fn target() -> Descriptor<Self>;
}

/// A delivery channel run through the two notification lifecycle phases.
#[async_trait]
pub trait Courier: Send + Sync {
    /// A unique, descriptive name for the courier (e.g., "log", "push").
    /// Used for routing, logging and metrics.
    fn name(&self) -> &str;

    /// The delivery channel whose flags this courier sets. Defaults to the
    /// courier's name.
    fn channel(&self) -> &str {
        self.name()
    }

    /// Runs before the notification is persisted.
    ///
    /// The notification has no storage identity yet. Couriers typically set
    /// their channel eligibility here.
    async fn prepare(&self, notification: &mut Notification) -> Result<()>;

    /// Runs after the notification is persisted.
    ///
    /// # Returns
    /// * `Ok(())` if the courier handled the notification (including deciding
    ///   to skip it)
    /// * `Err` if delivery failed (network error, rejected payload, etc.)
    async fn deliver(&self, notification: &mut Notification) -> Result<()>;
}

/// Durable storage for notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persists a new notification, assigning its identity and creation time.
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError>;

    /// Writes back the delivery flags of a persisted notification.
    async fn update(&self, notification: &Notification) -> Result<(), StoreError>;

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>, StoreError>;

    /// Notifications eligible for `channel`.
    async fn eligible(&self, channel: &str) -> Result<Vec<Notification>, StoreError>;

    /// Notifications eligible for `channel` that it has not finished processing.
    async fn unprocessed(&self, channel: &str) -> Result<Vec<Notification>, StoreError>;
}
