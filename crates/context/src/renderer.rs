//! Final output: the packed briefing plus a one-line opening message.

use serde::Serialize;

use crate::snapshot::UserSnapshot;
use crate::temporal::LastContact;

/// What a synthesis call hands to the conversational agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedContext {
    pub display_name: Option<String>,
    pub packed_context: String,
    pub opening_message: String,
}

impl SynthesizedContext {
    /// Generic context for when no user could be resolved.
    pub fn fallback(companion: &str) -> Self {
        Self {
            display_name: None,
            packed_context: format!(
                "You are {companion}, a warm wellness companion. Nothing is known about this user yet: keep the conversation gentle and general."
            ),
            opening_message: format!("Hi, I'm {companion}. How are you feeling today?"),
        }
    }
}

/// Nickname if set, otherwise the first word of the profile name.
pub fn display_name(snapshot: &UserSnapshot) -> Option<String> {
    snapshot
        .interests
        .nickname
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| snapshot.profile.first_name())
        .map(str::to_string)
}

pub fn opening_message(contact: LastContact, name: Option<&str>, companion: &str) -> String {
    match (contact, name) {
        (LastContact::FirstContact, Some(name)) => {
            format!("Hi {name}, I'm {companion}. What would you like me to know about you?")
        }
        (LastContact::FirstContact, None) => {
            format!("Hi, I'm {companion}. What should I call you?")
        }
        (LastContact::JustSpoke, Some(name)) => format!("We were just talking, {name}. Still here with you."),
        (LastContact::JustSpoke, None) => "We were just talking. Still here with you.".to_string(),
        (LastContact::ShortBreak, Some(name)) => format!("Welcome back, {name}."),
        (LastContact::ShortBreak, None) => "Welcome back.".to_string(),
        (_, Some(name)) => format!("Hi {name}, good to hear from you."),
        (_, None) => "Hi, good to hear from you.".to_string(),
    }
}
