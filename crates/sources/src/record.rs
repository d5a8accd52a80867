//! Everything the stores hold for one user, in one serializable struct.

use chrono::NaiveDate;
use kindred_core::domain::{
    BodyMetrics, DailyMetrics, HabitEntry, HabitStreak, Interests, Objective, Profile,
    SessionRecord, SessionSnapshot, StructuredFact, TopicMention, UserEvent,
};
use kindred_core::source::SourceDomain;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    pub profile: Profile,
    pub interests: Interests,
    pub objectives: Vec<Objective>,
    /// Check-in aggregates keyed by user-local date.
    pub daily_metrics: BTreeMap<NaiveDate, DailyMetrics>,
    pub sessions: Vec<SessionRecord>,
    /// Habit log keyed by user-local date.
    pub habit_log: BTreeMap<NaiveDate, Vec<HabitEntry>>,
    /// Body metric readings; the newest `recorded_at` wins.
    pub body_metrics: Vec<BodyMetrics>,
    pub events: Vec<UserEvent>,
    pub legacy_facts: Vec<String>,
    pub structured_facts: Vec<StructuredFact>,
    pub session_snapshots: Vec<SessionSnapshot>,
    pub topics: Vec<TopicMention>,
    pub streaks: Vec<HabitStreak>,
    /// Domains whose reads fail with a backend error, to exercise degraded
    /// synthesis from a fixture.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failing: Vec<SourceDomain>,
}

impl UserRecord {
    /// Latest body metric reading, or the empty reading when none exist.
    pub fn latest_body_metrics(&self) -> BodyMetrics {
        self.body_metrics
            .iter()
            .max_by_key(|m| m.recorded_at)
            .cloned()
            .unwrap_or_default()
    }
}
