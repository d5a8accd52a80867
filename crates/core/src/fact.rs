//! Facts: atomic, renderable pieces of knowledge about the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of categories a fact can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
    LifeEvent,
    Preference,
    Relationship,
    Health,
    Work,
    Hobby,
    Goal,
    Emotion,
    Routine,
}

impl FactCategory {
    /// Map a stored category name onto the enum. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        let category = match key.as_str() {
            "life_event" | "event" | "milestone" => Self::LifeEvent,
            "preference" | "like" | "dislike" => Self::Preference,
            "relationship" | "people" | "family" => Self::Relationship,
            "health" | "medical" => Self::Health,
            "work" | "career" => Self::Work,
            "hobby" | "interest" => Self::Hobby,
            "goal" | "aspiration" => Self::Goal,
            "emotion" | "emotional_pattern" => Self::Emotion,
            "routine" | "habit" => Self::Routine,
            _ => return None,
        };
        Some(category)
    }

    /// Prefix used when rendering a fact of this category.
    pub fn label(self) -> &'static str {
        match self {
            Self::LifeEvent => "Life event",
            Self::Preference => "Preference",
            Self::Relationship => "Relationship",
            Self::Health => "Health",
            Self::Work => "Work",
            Self::Hobby => "Hobby",
            Self::Goal => "Goal",
            Self::Emotion => "Emotional pattern",
            Self::Routine => "Routine",
        }
    }
}

/// Which store (or derivation) a fact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactSource {
    Structured,
    Legacy,
    Derived,
}

/// A single renderable unit of knowledge. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    text: String,
    pub category: Option<FactCategory>,
    pub source: FactSource,
    pub importance: u8,
    pub recency: Option<DateTime<Utc>>,
}

impl Fact {
    /// Build a fact from rendered text. Returns `None` for blank text.
    pub fn new(text: impl Into<String>, source: FactSource) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            category: None,
            source,
            importance: 0,
            recency: None,
        })
    }

    pub fn with_category(mut self, category: Option<FactCategory>) -> Self {
        self.category = category;
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_recency(mut self, recency: Option<DateTime<Utc>>) -> Self {
        self.recency = recency;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Synthesized blocks (session summaries, guardrails) rather than stored facts.
    pub fn is_derived(&self) -> bool {
        self.source == FactSource::Derived
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(Fact::new("   ", FactSource::Legacy).is_none());
        assert!(Fact::new("", FactSource::Structured).is_none());
    }

    #[test]
    fn text_is_trimmed() {
        let fact = Fact::new("  likes tea \n", FactSource::Legacy).unwrap();
        assert_eq!(fact.text(), "likes tea");
    }

    #[test]
    fn category_parse_is_lenient() {
        assert_eq!(FactCategory::parse("Life-Event"), Some(FactCategory::LifeEvent));
        assert_eq!(FactCategory::parse(" hobby "), Some(FactCategory::Hobby));
        assert_eq!(FactCategory::parse("travel"), None);
    }

    #[test]
    fn derived_flag_follows_source() {
        let fact = Fact::new("Recent sessions", FactSource::Derived).unwrap();
        assert!(fact.is_derived());
    }
}
