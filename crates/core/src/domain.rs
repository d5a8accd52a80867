//! Per-user data domains read by the source readers.
//!
//! Every type here has a well-defined empty value (`Default`), which is what
//! a reader returns when the store has no rows for the user.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Profile & preferences ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    /// Goal keys picked during onboarding (e.g. `reduce_anxiety`).
    pub selected_goals: Vec<String>,
    pub onboarding_answers: BTreeMap<String, String>,
    /// Opaque UI layout blob; carried through, never rendered.
    pub dashboard_config: serde_json::Value,
    /// Self-rated life areas, 0–10.
    pub life_area_scores: BTreeMap<String, f32>,
}

impl Profile {
    /// First word of the profile name, if any.
    pub fn first_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
    }

    /// Completed years between `birth_date` and `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = self.birth_date?;
        today.years_since(born)
    }
}

/// How the user asked to be supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    Listener,
    Advisor,
    Challenger,
    Comforter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub support_type: Option<SupportType>,
    pub challenges: Vec<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interests {
    pub nickname: Option<String>,
    pub preferences: Preferences,
}

// ── Objectives & daily state ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objective {
    pub title: String,
    pub category: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub starting_value: Option<f64>,
    pub unit: Option<String>,
}

impl Objective {
    /// Progress from starting value towards target, clamped to 0–100.
    pub fn progress_pct(&self) -> Option<u8> {
        let target = self.target_value?;
        let current = self.current_value?;
        let start = self.starting_value.unwrap_or(0.0);
        let span = target - start;
        if span.abs() < f64::EPSILON {
            return None;
        }
        let pct = ((current - start) / span * 100.0).clamp(0.0, 100.0);
        Some(pct.round() as u8)
    }
}

/// Today's check-in block. Each score is 0–10 when recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyMetrics {
    pub mood: Option<u8>,
    pub anxiety: Option<u8>,
    pub energy: Option<u8>,
    pub sleep: Option<u8>,
}

impl DailyMetrics {
    pub fn is_empty(&self) -> bool {
        self.mood.is_none() && self.anxiety.is_none() && self.energy.is_none() && self.sleep.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitEntry {
    pub habit_type: String,
    pub completed: bool,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitStreak {
    pub habit_type: String,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyMetrics {
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub resting_heart_rate: Option<u16>,
    pub steps: Option<u32>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl BodyMetrics {
    pub fn is_empty(&self) -> bool {
        self.weight_kg.is_none()
            && self.body_fat_pct.is_none()
            && self.resting_heart_rate.is_none()
            && self.steps.is_none()
    }
}

// ── Sessions ──────────────────────────────────────────────────────────────

/// A past voice or chat session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Mood detected during the session, 0–10.
    pub mood_score: Option<u8>,
    pub emotion_tags: Vec<String>,
    pub summary: Option<String>,
}

impl SessionRecord {
    /// End time when recorded, start time otherwise.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.ended_at.unwrap_or(self.started_at)
    }
}

/// Post-session summary produced by the upstream summarizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub topics: Vec<String>,
    pub unresolved_issues: Vec<String>,
    pub needs_follow_up: bool,
    pub created_at: DateTime<Utc>,
}

// ── Events ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

/// A dated event the user told the companion about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEvent {
    pub title: String,
    pub event_type: Option<String>,
    pub location: Option<String>,
    pub date: NaiveDate,
    /// Local time of day; accepts `HH:MM` or `HH:MM:SS`.
    #[serde(with = "time_of_day")]
    pub time: Option<NaiveTime>,
    pub status: EventStatus,
    pub follow_up_done: bool,
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format("%H:%M:%S").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Ok(None);
        };
        NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M"))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

// ── Long-term knowledge ───────────────────────────────────────────────────

/// A row of the categorized fact store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredFact {
    /// Raw category name as stored (e.g. `life_event`, `travel`).
    pub category: String,
    pub text: String,
    pub importance: u8,
    pub last_referenced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    #[default]
    Normal,
    Sensitive,
    AvoidUnlessIntroduced,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicMention {
    pub topic: String,
    pub mention_count: u32,
    pub sensitivity: Sensitivity,
}

impl TopicMention {
    /// Whether the companion must wait for the user to raise this topic.
    pub fn is_guarded(&self) -> bool {
        self.sensitivity != Sensitivity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_time_accepts_short_form() {
        let json = r#"{"title":"Dentist","date":"2026-10-18","time":"09:00"}"#;
        let event: UserEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(event.status, EventStatus::Upcoming);
        assert!(!event.follow_up_done);
    }

    #[test]
    fn event_without_time_is_none() {
        let json = r#"{"title":"Trip","date":"2026-10-20"}"#;
        let event: UserEvent = serde_json::from_str(json).unwrap();
        assert!(event.time.is_none());
    }

    #[test]
    fn objective_progress_from_start() {
        let obj = Objective {
            title: "Run 10k".into(),
            target_value: Some(10.0),
            current_value: Some(4.0),
            starting_value: Some(2.0),
            unit: Some("km".into()),
            ..Objective::default()
        };
        assert_eq!(obj.progress_pct(), Some(25));
    }

    #[test]
    fn objective_progress_needs_span() {
        let obj = Objective {
            target_value: Some(5.0),
            current_value: Some(5.0),
            starting_value: Some(5.0),
            ..Objective::default()
        };
        assert_eq!(obj.progress_pct(), None);
    }

    #[test]
    fn age_counts_completed_years() {
        let profile = Profile {
            birth_date: NaiveDate::from_ymd_opt(1990, 10, 19),
            ..Profile::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(profile.age_on(today), Some(35));
    }

    #[test]
    fn session_falls_back_to_start_time() {
        let session = SessionRecord::default();
        assert_eq!(session.last_activity(), session.started_at);
    }

    #[test]
    fn normal_topics_are_not_guarded() {
        let topic = TopicMention {
            topic: "work".into(),
            mention_count: 4,
            sensitivity: Sensitivity::Normal,
        };
        assert!(!topic.is_guarded());
    }
}
