/// notifiable - resolve who should hear about an event and deliver it
///
/// This library resolves the sender, receivers and target of a notifiable
/// object, suppresses self-notification, persists one notification per
/// receiver and runs every registered courier through its `prepare` and
/// `deliver` phases around the write.
pub mod activity;
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod courier;
pub mod dispatch;
pub mod error;
pub mod formatting;
pub mod resolver;
pub mod store;

// Re-export core types for convenience
pub use crate::core::*;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{ConfigError, DispatchError};
pub use resolver::{Descriptor, Resolved, Role};
