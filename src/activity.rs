//! The built-in activity notifiable.
//!
//! An activity is something a user did (`actor`) that a set of users
//! (`recipients`) should hear about, optionally pointing at a `subject`.

use crate::core::{Notifiable, Participant, ParticipantRef};
use crate::resolver::{AccessorTable, Descriptor, Resolved};
use serde::{Deserialize, Serialize};

pub const ACTIVITY_KIND: &str = "activity";
pub const USER_KIND: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    /// User id of whoever performed the activity
    #[serde(default)]
    pub actor: Option<String>,
    /// User ids that should be notified
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub subject: Option<ParticipantRef>,
}

fn user(id: &str) -> ParticipantRef {
    ParticipantRef::new(USER_KIND, id)
}

impl Activity {
    pub fn actor(&self) -> Resolved {
        self.actor
            .as_deref()
            .map_or(Resolved::Absent, |id| Resolved::One(user(id)))
    }

    pub fn recipients(&self) -> Resolved {
        Resolved::Many(self.recipients.iter().map(|id| user(id)).collect())
    }

    pub fn subject(&self) -> Resolved {
        Resolved::maybe(self.subject.as_ref())
    }

    /// Accessors that configuration may name in descriptors.
    pub fn accessors() -> AccessorTable<Activity> {
        AccessorTable::new(ACTIVITY_KIND)
            .with("actor", Activity::actor)
            .with("recipients", Activity::recipients)
            .with("subject", Activity::subject)
    }
}

impl Participant for Activity {
    fn participant_ref(&self) -> ParticipantRef {
        ParticipantRef::new(ACTIVITY_KIND, &self.id)
    }
}

impl Notifiable for Activity {
    fn kind() -> &'static str {
        ACTIVITY_KIND
    }

    fn receiver() -> Descriptor<Self> {
        Descriptor::method("recipients", Activity::recipients)
    }

    fn sender() -> Descriptor<Self> {
        Descriptor::method("actor", Activity::actor)
    }

    fn target() -> Descriptor<Self> {
        Descriptor::method("subject", Activity::subject)
    }
}
