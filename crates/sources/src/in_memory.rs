//! In-memory source: useful for testing and for serving fixtures.

use async_trait::async_trait;
use chrono::NaiveDate;
use kindred_core::domain::{
    BodyMetrics, DailyMetrics, HabitEntry, HabitStreak, Interests, Objective, Profile,
    SessionRecord, SessionSnapshot, StructuredFact, TopicMention, UserEvent,
};
use kindred_core::error::SourceError;
use kindred_core::source::{SourceDomain, UserDataSource};
use kindred_core::user::{AuthToken, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::record::UserRecord;

/// A source that keeps every user's records in a map.
///
/// Reads for a user without a record return the empty default of each
/// domain, exactly like a database with no rows. Domains listed in a
/// record's `failing` set return [`SourceError::Backend`].
#[derive(Debug)]
pub struct InMemorySource {
    name: String,
    tokens: RwLock<HashMap<String, UserId>>,
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::named("in_memory")
    }

    /// Create an empty source reporting the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokens: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style registration of a user behind a token.
    pub fn with_user(mut self, token: &str, user: UserId, record: UserRecord) -> Self {
        self.tokens.get_mut().insert(token.to_string(), user);
        self.users.get_mut().insert(user, record);
        self
    }

    /// Register (or replace) a user behind a token.
    pub async fn insert(&self, token: &str, user: UserId, record: UserRecord) {
        self.tokens.write().await.insert(token.to_string(), user);
        self.users.write().await.insert(user, record);
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    async fn read<T, F>(&self, user: &UserId, domain: SourceDomain, f: F) -> Result<T, SourceError>
    where
        T: Default,
        F: FnOnce(&UserRecord) -> T,
    {
        let users = self.users.read().await;
        let Some(record) = users.get(user) else {
            return Ok(T::default());
        };
        if record.failing.contains(&domain) {
            debug!(source = %self.name, domain = %domain, "Read marked failing");
            return Err(SourceError::backend(domain, format!("{} read failed", self.name)));
        }
        Ok(f(record))
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDataSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn authenticate(&self, token: &AuthToken) -> Result<UserId, SourceError> {
        if token.is_empty() {
            return Err(SourceError::Unauthorized("empty session token".into()));
        }
        self.tokens
            .read()
            .await
            .get(token.as_str())
            .copied()
            .ok_or_else(|| SourceError::Unauthorized("unknown session token".into()))
    }

    async fn profile(&self, user: &UserId) -> Result<Profile, SourceError> {
        self.read(user, SourceDomain::Profile, |r| r.profile.clone()).await
    }

    async fn interests(&self, user: &UserId) -> Result<Interests, SourceError> {
        self.read(user, SourceDomain::Interests, |r| r.interests.clone()).await
    }

    async fn objectives(&self, user: &UserId) -> Result<Vec<Objective>, SourceError> {
        self.read(user, SourceDomain::Objectives, |r| r.objectives.clone()).await
    }

    async fn daily_metrics(&self, user: &UserId, day: NaiveDate) -> Result<DailyMetrics, SourceError> {
        self.read(user, SourceDomain::DailyMetrics, |r| r.daily_metrics.get(&day).copied().unwrap_or_default())
            .await
    }

    async fn recent_sessions(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, SourceError> {
        self.read(user, SourceDomain::RecentSessions, |r| {
            let mut sessions = r.sessions.clone();
            sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            sessions.truncate(limit);
            sessions
        })
        .await
    }

    async fn habit_entries(&self, user: &UserId, day: NaiveDate) -> Result<Vec<HabitEntry>, SourceError> {
        self.read(user, SourceDomain::HabitEntries, |r| r.habit_log.get(&day).cloned().unwrap_or_default())
            .await
    }

    async fn latest_body_metrics(&self, user: &UserId) -> Result<BodyMetrics, SourceError> {
        self.read(user, SourceDomain::BodyMetrics, UserRecord::latest_body_metrics).await
    }

    async fn events(&self, user: &UserId) -> Result<Vec<UserEvent>, SourceError> {
        self.read(user, SourceDomain::Events, |r| r.events.clone()).await
    }

    async fn legacy_facts(&self, user: &UserId) -> Result<Vec<String>, SourceError> {
        self.read(user, SourceDomain::LegacyFacts, |r| r.legacy_facts.clone()).await
    }

    async fn structured_facts(&self, user: &UserId) -> Result<Vec<StructuredFact>, SourceError> {
        self.read(user, SourceDomain::StructuredFacts, |r| r.structured_facts.clone()).await
    }

    async fn session_snapshots(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SessionSnapshot>, SourceError> {
        self.read(user, SourceDomain::SessionSnapshots, |r| {
            let mut snapshots = r.session_snapshots.clone();
            snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            snapshots.truncate(limit);
            snapshots
        })
        .await
    }

    async fn topic_registry(&self, user: &UserId) -> Result<Vec<TopicMention>, SourceError> {
        self.read(user, SourceDomain::TopicRegistry, |r| r.topics.clone()).await
    }

    async fn habit_streaks(&self, user: &UserId) -> Result<Vec<HabitStreak>, SourceError> {
        self.read(user, SourceDomain::HabitStreaks, |r| r.streaks.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session(day: u32) -> SessionRecord {
        SessionRecord {
            started_at: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
            ..SessionRecord::default()
        }
    }

    #[tokio::test]
    async fn authenticate_known_token() {
        let user = UserId::new();
        let src = InMemorySource::new().with_user("tok", user, UserRecord::default());
        let resolved = src.authenticate(&AuthToken::new("tok")).await.unwrap();
        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let src = InMemorySource::new();
        let err = src.authenticate(&AuthToken::new("nope")).await.unwrap_err();
        assert!(matches!(err, SourceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn missing_user_reads_are_empty() {
        let src = InMemorySource::new();
        let user = UserId::new();
        assert!(src.legacy_facts(&user).await.unwrap().is_empty());
        assert_eq!(src.profile(&user).await.unwrap(), Profile::default());
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(src.daily_metrics(&user, day).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_come_back_newest_first_and_limited() {
        let user = UserId::new();
        let record = UserRecord {
            sessions: vec![session(1), session(15), session(9)],
            ..UserRecord::default()
        };
        let src = InMemorySource::new().with_user("tok", user, record);
        let sessions = src.recent_sessions(&user, 2).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].started_at, session(15).started_at);
        assert_eq!(sessions[1].started_at, session(9).started_at);
    }

    #[tokio::test]
    async fn failing_domain_errors_others_still_read() {
        let user = UserId::new();
        let record = UserRecord {
            legacy_facts: vec!["Plays piano".into()],
            failing: vec![SourceDomain::BodyMetrics],
            ..UserRecord::default()
        };
        let src = InMemorySource::named("fixture").with_user("tok", user, record);
        let err = src.latest_body_metrics(&user).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Backend {
                domain: SourceDomain::BodyMetrics,
                ..
            }
        ));
        assert_eq!(src.legacy_facts(&user).await.unwrap(), vec!["Plays piano"]);
    }

    #[tokio::test]
    async fn insert_replaces_record() {
        let src = InMemorySource::new();
        let user = UserId::new();
        src.insert("a", user, UserRecord::default()).await;
        let record = UserRecord {
            legacy_facts: vec!["Plays piano".into()],
            ..UserRecord::default()
        };
        src.insert("a", user, record).await;
        assert_eq!(src.user_count().await, 1);
        assert_eq!(src.legacy_facts(&user).await.unwrap(), vec!["Plays piano"]);
    }
}
