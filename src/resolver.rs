//! Participant resolution.
//!
//! A notifiable type describes how to find each of its participants with a
//! [`Descriptor`]: a bound accessor method, an arbitrary callable, or nothing.
//! [`interpret`] turns a descriptor into zero, one or many participants for a
//! given instance, the same way for every role.

use crate::core::{Notifiable, Participant, ParticipantRef};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A zero-argument accessor on a notifiable instance.
pub type Accessor<T> = fn(&T) -> Resolved;

/// The role a descriptor resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Receiver,
    Sender,
    Target,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Receiver => "receiver",
            Role::Sender => "sender",
            Role::Target => "target",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of resolving a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolved {
    #[default]
    Absent,
    One(ParticipantRef),
    Many(Vec<ParticipantRef>),
}

impl Resolved {
    pub fn one<P: Participant + ?Sized>(participant: &P) -> Self {
        Resolved::One(participant.participant_ref())
    }

    pub fn maybe<P: Participant>(participant: Option<&P>) -> Self {
        participant.map_or(Resolved::Absent, Resolved::one)
    }

    pub fn many<'a, P, I>(participants: I) -> Self
    where
        P: Participant + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        Resolved::Many(
            participants
                .into_iter()
                .map(Participant::participant_ref)
                .collect(),
        )
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    /// Flattens the result into a collection; a single participant becomes a
    /// one-element collection and absence becomes an empty one.
    pub fn into_vec(self) -> Vec<ParticipantRef> {
        match self {
            Resolved::Absent => Vec::new(),
            Resolved::One(participant) => vec![participant],
            Resolved::Many(participants) => participants,
        }
    }

    /// Narrows the result to at most one participant.
    ///
    /// An empty collection counts as absent. More than one participant is a
    /// configuration error for roles that name a single participant.
    pub fn into_single(self, role: Role) -> Result<Option<ParticipantRef>, ConfigError> {
        match self {
            Resolved::Absent => Ok(None),
            Resolved::One(participant) => Ok(Some(participant)),
            Resolved::Many(mut participants) => match participants.len() {
                0 => Ok(None),
                1 => Ok(participants.pop()),
                count => Err(ConfigError::AmbiguousParticipant { role, count }),
            },
        }
    }
}

/// A type-level declaration of how to resolve one role.
pub enum Descriptor<T> {
    /// The type declares no resolution for this role.
    Absent,
    /// A name reference bound to an accessor at configuration time.
    Method {
        name: &'static str,
        accessor: Accessor<T>,
    },
    /// An arbitrary callable invoked with the instance.
    Callable(Arc<dyn Fn(&T) -> Resolved + Send + Sync>),
    /// A name reference that has not been bound to an accessor yet.
    Named(String),
}

impl<T> Descriptor<T> {
    pub fn method(name: &'static str, accessor: Accessor<T>) -> Self {
        Descriptor::Method { name, accessor }
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&T) -> Resolved + Send + Sync + 'static,
    {
        Descriptor::Callable(Arc::new(f))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Descriptor::Named(name.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Descriptor::Absent)
    }

    /// Binds a `Named` descriptor to the accessor registered under its name.
    /// Other shapes are returned unchanged.
    pub fn bind(self, table: &AccessorTable<T>) -> Result<Self, ConfigError> {
        match self {
            Descriptor::Named(name) => {
                table
                    .lookup(&name)
                    .ok_or_else(|| ConfigError::UnknownAccessor {
                        kind: table.kind,
                        name,
                    })
            }
            other => Ok(other),
        }
    }
}

impl<T> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        match self {
            Descriptor::Absent => Descriptor::Absent,
            Descriptor::Method { name, accessor } => Descriptor::Method {
                name: *name,
                accessor: *accessor,
            },
            Descriptor::Callable(f) => Descriptor::Callable(Arc::clone(f)),
            Descriptor::Named(name) => Descriptor::Named(name.clone()),
        }
    }
}

impl<T> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Absent => f.write_str("Absent"),
            Descriptor::Method { name, .. } => f.debug_tuple("Method").field(name).finish(),
            Descriptor::Callable(_) => f.write_str("Callable(..)"),
            Descriptor::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// The accessors a notifiable type exposes by name.
///
/// Used to bind descriptors that come from configuration rather than code.
pub struct AccessorTable<T> {
    kind: &'static str,
    entries: Vec<(&'static str, Accessor<T>)>,
}

impl<T> AccessorTable<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, accessor: Accessor<T>) -> Self {
        self.entries.push((name, accessor));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Descriptor<T>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(entry, accessor)| Descriptor::method(*entry, *accessor))
    }
}

/// The receiver, sender and target descriptors of one notifiable type.
pub struct Descriptors<T> {
    pub receiver: Descriptor<T>,
    pub sender: Descriptor<T>,
    pub target: Descriptor<T>,
}

impl<T> Clone for Descriptors<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            sender: self.sender.clone(),
            target: self.target.clone(),
        }
    }
}

impl<T> fmt::Debug for Descriptors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptors")
            .field("receiver", &self.receiver)
            .field("sender", &self.sender)
            .field("target", &self.target)
            .finish()
    }
}

impl<T: Notifiable> Descriptors<T> {
    /// Reads the descriptors the type declares.
    pub fn of() -> Self {
        Self {
            receiver: T::receiver(),
            sender: T::sender(),
            target: T::target(),
        }
    }
}

impl<T> Descriptors<T> {
    pub fn get(&self, role: Role) -> &Descriptor<T> {
        match role {
            Role::Receiver => &self.receiver,
            Role::Sender => &self.sender,
            Role::Target => &self.target,
        }
    }

    pub fn bind(self, table: &AccessorTable<T>) -> Result<Self, ConfigError> {
        Ok(Self {
            receiver: self.receiver.bind(table)?,
            sender: self.sender.bind(table)?,
            target: self.target.bind(table)?,
        })
    }
}

/// Resolves `descriptor` against `instance`.
///
/// Absent descriptors resolve to [`Resolved::Absent`] without invoking
/// anything. Callables and bound methods are invoked once and their result is
/// returned unmodified. An unbound name is a configuration error.
pub fn interpret<T>(
    role: Role,
    descriptor: &Descriptor<T>,
    instance: &T,
) -> Result<Resolved, ConfigError> {
    match descriptor {
        Descriptor::Absent => Ok(Resolved::Absent),
        Descriptor::Method { accessor, .. } => Ok(accessor(instance)),
        Descriptor::Callable(f) => Ok(f(instance)),
        Descriptor::Named(name) => Err(ConfigError::UnboundDescriptor {
            role,
            name: name.clone(),
        }),
    }
}
