//! An in-memory notification store.

use super::StoreError;
use crate::core::{Notification, NotificationId, NotificationStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps notifications in a map keyed by their assigned identity.
///
/// Identities start at 1 and increase monotonically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

#[derive(Debug, Default)]
struct Table {
    last_id: NotificationId,
    rows: BTreeMap<NotificationId, Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored notifications in identity order.
    pub async fn all(&self) -> Vec<Notification> {
        self.table.read().await.rows.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn select<F>(&self, predicate: F) -> Vec<Notification>
    where
        F: Fn(&Notification) -> bool,
    {
        self.table
            .read()
            .await
            .rows
            .values()
            .filter(|n| predicate(n))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, mut notification: Notification) -> Result<Notification, StoreError> {
        if let Some(id) = notification.id {
            return Err(StoreError::AlreadyPersisted(id));
        }

        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;
        notification.id = Some(id);
        notification.created_at = Some(Utc::now());
        table.rows.insert(id, notification.clone());
        debug!(id, "Inserted notification");
        Ok(notification)
    }

    async fn update(&self, notification: &Notification) -> Result<(), StoreError> {
        let id = notification.id.ok_or(StoreError::NotPersisted)?;
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(row) => {
                *row = notification.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn eligible(&self, channel: &str) -> Result<Vec<Notification>, StoreError> {
        Ok(self.select(|n| n.is_eligible(channel)).await)
    }

    async fn unprocessed(&self, channel: &str) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .select(|n| n.is_eligible(channel) && !n.is_processed(channel))
            .await)
    }
}
