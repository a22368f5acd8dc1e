pub mod memory;

use crate::core::NotificationId;
use thiserror::Error;

pub use crate::core::NotificationStore;
pub use memory::MemoryStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("notification {0} is already persisted")]
    AlreadyPersisted(NotificationId),

    #[error("notification has not been persisted yet")]
    NotPersisted,

    #[error("notification {0} not found")]
    NotFound(NotificationId),

    #[error("storage backend failure: {0}")]
    Backend(String),
}
