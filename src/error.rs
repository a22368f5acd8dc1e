//! Error types shared by resolution, dispatch and courier registration.

use crate::courier::Phase;
use crate::resolver::Role;
use crate::store::StoreError;
use thiserror::Error;

/// A notifiable type or courier route is misconfigured.
///
/// These are never retried; they indicate a registration that has to be fixed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{role} descriptor `{name}` is not bound to an accessor")]
    UnboundDescriptor { role: Role, name: String },

    #[error("{role} descriptor resolved {count} participants, expected at most one")]
    AmbiguousParticipant { role: Role, count: usize },

    #[error("no accessor named `{name}` is registered for `{kind}`")]
    UnknownAccessor { kind: &'static str, name: String },

    #[error("route for `{kind}` names unknown courier `{courier}`")]
    UnknownCourier { kind: String, courier: String },
}

/// A failure while dispatching a notifiable event.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("courier `{courier}` failed during {phase}")]
    Courier {
        courier: String,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
