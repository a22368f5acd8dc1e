#![allow(dead_code)]
//! Couriers and stores that record what happened to them, in order.

use async_trait::async_trait;
use notifiable::{
    store::{MemoryStore, StoreError},
    Courier, Notification, NotificationId, NotificationStore,
};
use std::sync::{Arc, Mutex};

/// An ordered log of lifecycle events shared between couriers and stores.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Entries whose event matches `prefix` (e.g. "prepare").
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// Records `phase:name:receiver:persisted` for every invocation.
#[derive(Clone, Debug)]
pub struct RecordingCourier {
    pub name: String,
    pub journal: Journal,
}

impl RecordingCourier {
    pub fn new(name: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            journal: journal.clone(),
        })
    }

    fn record(&self, phase: &str, notification: &Notification) {
        self.journal.record(format!(
            "{}:{}:{}:{}",
            phase,
            self.name,
            notification.receiver.id,
            notification.is_persisted()
        ));
    }
}

#[async_trait]
impl Courier for RecordingCourier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn prepare(&self, notification: &mut Notification) -> anyhow::Result<()> {
        self.record("prepare", notification);
        notification.opt_in(&self.name);
        Ok(())
    }

    async fn deliver(&self, notification: &mut Notification) -> anyhow::Result<()> {
        self.record("deliver", notification);
        notification.mark_processed(&self.name);
        Ok(())
    }
}

/// Which phase a `FailingCourier` fails in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FailIn {
    Prepare,
    Deliver,
}

/// Records like `RecordingCourier`, then fails in the chosen phase.
#[derive(Clone, Debug)]
pub struct FailingCourier {
    pub inner: RecordingCourier,
    pub fail_in: FailIn,
}

impl FailingCourier {
    pub fn new(name: &str, journal: &Journal, fail_in: FailIn) -> Arc<Self> {
        Arc::new(Self {
            inner: RecordingCourier {
                name: name.to_string(),
                journal: journal.clone(),
            },
            fail_in,
        })
    }
}

#[async_trait]
impl Courier for FailingCourier {
    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn prepare(&self, notification: &mut Notification) -> anyhow::Result<()> {
        self.inner.prepare(notification).await?;
        if self.fail_in == FailIn::Prepare {
            anyhow::bail!("{} refused to prepare", self.inner.name);
        }
        Ok(())
    }

    async fn deliver(&self, notification: &mut Notification) -> anyhow::Result<()> {
        if self.fail_in == FailIn::Deliver {
            self.inner.record("deliver", notification);
            anyhow::bail!("{} could not deliver", self.inner.name);
        }
        self.inner.deliver(notification).await
    }
}

/// A `MemoryStore` that journals `insert:receiver:id` on every write.
pub struct JournalStore {
    pub inner: MemoryStore,
    pub journal: Journal,
}

impl JournalStore {
    pub fn new(journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            journal: journal.clone(),
        })
    }
}

#[async_trait]
impl NotificationStore for JournalStore {
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        let saved = self.inner.insert(notification).await?;
        self.journal.record(format!(
            "insert:{}:{}",
            saved.receiver.id,
            saved.id.unwrap_or_default()
        ));
        Ok(saved)
    }

    async fn update(&self, notification: &Notification) -> Result<(), StoreError> {
        self.inner.update(notification).await
    }

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>, StoreError> {
        self.inner.get(id).await
    }

    async fn eligible(&self, channel: &str) -> Result<Vec<Notification>, StoreError> {
        self.inner.eligible(channel).await
    }

    async fn unprocessed(&self, channel: &str) -> Result<Vec<Notification>, StoreError> {
        self.inner.unprocessed(channel).await
    }
}

/// A store whose backend is down.
pub struct BrokenStore;

#[async_trait]
impl NotificationStore for BrokenStore {
    async fn insert(&self, _notification: Notification) -> Result<Notification, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn update(&self, _notification: &Notification) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn get(&self, _id: NotificationId) -> Result<Option<Notification>, StoreError> {
        Ok(None)
    }

    async fn eligible(&self, _channel: &str) -> Result<Vec<Notification>, StoreError> {
        Ok(Vec::new())
    }

    async fn unprocessed(&self, _channel: &str) -> Result<Vec<Notification>, StoreError> {
        Ok(Vec::new())
    }
}
