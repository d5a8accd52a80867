//! The request-scoped aggregate of every source read.

use kindred_core::domain::{
    BodyMetrics, DailyMetrics, HabitEntry, HabitStreak, Interests, Objective, Profile,
    SessionRecord, SessionSnapshot, StructuredFact, TopicMention, UserEvent,
};
use kindred_core::source::SourceDomain;
use kindred_core::user::UserId;

/// Everything known about one user for one synthesis call.
///
/// Built once by the aggregator and only handed out by shared reference
/// afterwards. Domains whose read failed hold their empty default and are
/// listed in `failed_sources`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSnapshot {
    pub user_id: UserId,
    pub profile: Profile,
    pub interests: Interests,
    pub objectives: Vec<Objective>,
    pub daily_metrics: DailyMetrics,
    /// Newest first.
    pub recent_sessions: Vec<SessionRecord>,
    pub habit_entries: Vec<HabitEntry>,
    pub body_metrics: BodyMetrics,
    pub events: Vec<UserEvent>,
    pub legacy_facts: Vec<String>,
    pub structured_facts: Vec<StructuredFact>,
    pub session_snapshots: Vec<SessionSnapshot>,
    pub topics: Vec<TopicMention>,
    pub streaks: Vec<HabitStreak>,
    pub failed_sources: Vec<SourceDomain>,
}

impl UserSnapshot {
    /// A snapshot with no data at all for `user_id`.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Whether any source read had to be replaced by its default.
    pub fn is_degraded(&self) -> bool {
        !self.failed_sources.is_empty()
    }
}
