#![allow(dead_code)]
//! Notifiable fixtures shared by the integration tests.

use notifiable::{Descriptor, Notifiable, Participant, ParticipantRef, Resolved};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
}

impl User {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }

    pub fn participant(id: &str) -> ParticipantRef {
        ParticipantRef::new("user", id)
    }
}

impl Participant for User {
    fn participant_ref(&self) -> ParticipantRef {
        User::participant(&self.id)
    }
}

/// Notifies its author; declares no sender and no target.
pub struct Article {
    pub id: u32,
    pub author: User,
}

impl Article {
    fn author(&self) -> Resolved {
        Resolved::one(&self.author)
    }
}

impl Participant for Article {
    fn participant_ref(&self) -> ParticipantRef {
        ParticipantRef::new("article", self.id.to_string())
    }
}

impl Notifiable for Article {
    fn kind() -> &'static str {
        "article"
    }

    fn receiver() -> Descriptor<Self> {
        Descriptor::method("author", Article::author)
    }

    fn sender() -> Descriptor<Self> {
        Descriptor::Absent
    }

    fn target() -> Descriptor<Self> {
        Descriptor::Absent
    }
}

/// Notifies its participants on behalf of the poster, pointing at the latest
/// reply.
pub struct Thread {
    pub id: u32,
    pub participants: Vec<User>,
    pub poster: Option<User>,
    pub reply: Option<u32>,
}

impl Thread {
    fn participants(&self) -> Resolved {
        Resolved::many(&self.participants)
    }

    fn poster(&self) -> Resolved {
        Resolved::maybe(self.poster.as_ref())
    }
}

impl Participant for Thread {
    fn participant_ref(&self) -> ParticipantRef {
        ParticipantRef::new("thread", self.id.to_string())
    }
}

impl Notifiable for Thread {
    fn kind() -> &'static str {
        "thread"
    }

    fn receiver() -> Descriptor<Self> {
        Descriptor::method("participants", Thread::participants)
    }

    fn sender() -> Descriptor<Self> {
        Descriptor::method("poster", Thread::poster)
    }

    fn target() -> Descriptor<Self> {
        Descriptor::callable(|thread: &Thread| {
            thread
                .reply
                .map_or(Resolved::Absent, |id| {
                    Resolved::One(ParticipantRef::new("reply", id.to_string()))
                })
        })
    }
}

/// Resolves receivers through a callable over its watchers.
pub struct Watchable {
    pub id: u32,
    pub watchers: Vec<User>,
}

impl Watchable {
    pub fn watchers(&self) -> &[User] {
        &self.watchers
    }
}

impl Participant for Watchable {
    fn participant_ref(&self) -> ParticipantRef {
        ParticipantRef::new("watchable", self.id.to_string())
    }
}

impl Notifiable for Watchable {
    fn kind() -> &'static str {
        "watchable"
    }

    fn receiver() -> Descriptor<Self> {
        Descriptor::callable(|inst: &Watchable| Resolved::many(inst.watchers()))
    }

    fn sender() -> Descriptor<Self> {
        Descriptor::Absent
    }

    fn target() -> Descriptor<Self> {
        Descriptor::Absent
    }
}

/// Declares no receiver at all.
pub struct Silent {
    pub id: u32,
}

impl Participant for Silent {
    fn participant_ref(&self) -> ParticipantRef {
        ParticipantRef::new("silent", self.id.to_string())
    }
}

impl Notifiable for Silent {
    fn kind() -> &'static str {
        "silent"
    }

    fn receiver() -> Descriptor<Self> {
        Descriptor::Absent
    }

    fn sender() -> Descriptor<Self> {
        Descriptor::Absent
    }

    fn target() -> Descriptor<Self> {
        Descriptor::Absent
    }
}

pub fn thread(participants: &[&str], poster: Option<&str>) -> Thread {
    Thread {
        id: 1,
        participants: participants.iter().map(|id| User::new(id)).collect(),
        poster: poster.map(User::new),
        reply: None,
    }
}
