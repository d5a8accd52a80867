//! Source reader trait: the read-only view of the external per-user stores.
//!
//! Each method reads one data domain for one user. An empty store is not an
//! error: readers return the domain's `Default` value when there are no rows.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{
    BodyMetrics, DailyMetrics, HabitEntry, HabitStreak, Interests, Objective, Profile,
    SessionRecord, SessionSnapshot, StructuredFact, TopicMention, UserEvent,
};
use crate::error::SourceError;
use crate::user::{AuthToken, UserId};

/// The data domains a synthesis call reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDomain {
    Profile,
    Interests,
    Objectives,
    DailyMetrics,
    RecentSessions,
    HabitEntries,
    BodyMetrics,
    Events,
    LegacyFacts,
    StructuredFacts,
    SessionSnapshots,
    TopicRegistry,
    HabitStreaks,
}

impl SourceDomain {
    pub const ALL: [SourceDomain; 13] = [
        Self::Profile,
        Self::Interests,
        Self::Objectives,
        Self::DailyMetrics,
        Self::RecentSessions,
        Self::HabitEntries,
        Self::BodyMetrics,
        Self::Events,
        Self::LegacyFacts,
        Self::StructuredFacts,
        Self::SessionSnapshots,
        Self::TopicRegistry,
        Self::HabitStreaks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Interests => "interests",
            Self::Objectives => "objectives",
            Self::DailyMetrics => "daily_metrics",
            Self::RecentSessions => "recent_sessions",
            Self::HabitEntries => "habit_entries",
            Self::BodyMetrics => "body_metrics",
            Self::Events => "events",
            Self::LegacyFacts => "legacy_facts",
            Self::StructuredFacts => "structured_facts",
            Self::SessionSnapshots => "session_snapshots",
            Self::TopicRegistry => "topic_registry",
            Self::HabitStreaks => "habit_streaks",
        }
    }
}

impl fmt::Display for SourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The core source trait.
///
/// Implementations: in-memory (tests), JSON fixture file, and whatever
/// database-backed reader the host application provides.
#[async_trait]
pub trait UserDataSource: Send + Sync {
    /// The source name (e.g., "in_memory", "json_file").
    fn name(&self) -> &str;

    /// Resolve the opaque handle to a user. Any error means "no valid user".
    async fn authenticate(&self, token: &AuthToken) -> Result<UserId, SourceError>;

    async fn profile(&self, user: &UserId) -> Result<Profile, SourceError>;

    async fn interests(&self, user: &UserId) -> Result<Interests, SourceError>;

    /// Active objectives only.
    async fn objectives(&self, user: &UserId) -> Result<Vec<Objective>, SourceError>;

    /// Aggregate of check-ins recorded on `day` (user-local date).
    async fn daily_metrics(&self, user: &UserId, day: NaiveDate) -> Result<DailyMetrics, SourceError>;

    /// Up to `limit` sessions, newest first.
    async fn recent_sessions(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, SourceError>;

    async fn habit_entries(&self, user: &UserId, day: NaiveDate) -> Result<Vec<HabitEntry>, SourceError>;

    async fn latest_body_metrics(&self, user: &UserId) -> Result<BodyMetrics, SourceError>;

    /// Upcoming and recent events.
    async fn events(&self, user: &UserId) -> Result<Vec<UserEvent>, SourceError>;

    /// The free-text fact list stored on the profile.
    async fn legacy_facts(&self, user: &UserId) -> Result<Vec<String>, SourceError>;

    async fn structured_facts(&self, user: &UserId) -> Result<Vec<StructuredFact>, SourceError>;

    /// Up to `limit` session summaries, newest first.
    async fn session_snapshots(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SessionSnapshot>, SourceError>;

    async fn topic_registry(&self, user: &UserId) -> Result<Vec<TopicMention>, SourceError>;

    async fn habit_streaks(&self, user: &UserId) -> Result<Vec<HabitStreak>, SourceError>;
}
