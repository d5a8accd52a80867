//! Multi-source aggregation: one concurrent batch of reads per call.
//!
//! Every domain read runs concurrently under its own timeout. A read that
//! fails or times out is logged and replaced by the domain's empty default,
//! so partial data never blocks synthesis. Only authentication can abort
//! the call.

use chrono::NaiveDate;
use kindred_config::AppConfig;
use kindred_core::error::{Result, SourceError, SynthesisError};
use kindred_core::source::{SourceDomain, UserDataSource};
use kindred_core::user::AuthToken;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::snapshot::UserSnapshot;

/// Issues all source reads for one user and assembles a [`UserSnapshot`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    read_timeout: Duration,
    session_limit: usize,
    snapshot_limit: usize,
}

impl Aggregator {
    pub fn new(read_timeout: Duration, session_limit: usize, snapshot_limit: usize) -> Self {
        Self {
            read_timeout,
            session_limit,
            snapshot_limit,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.sources.read_timeout(),
            config.synthesis.session_fetch_limit,
            config.synthesis.session_summary_limit,
        )
    }

    /// Authenticate, then read every domain concurrently.
    ///
    /// `today` is the user-local date used by the daily-metrics and
    /// habit-log reads. Dropping the returned future abandons any reads
    /// still in flight.
    pub async fn collect(
        &self,
        source: &dyn UserDataSource,
        token: &AuthToken,
        today: NaiveDate,
    ) -> Result<UserSnapshot> {
        let user = match tokio::time::timeout(self.read_timeout, source.authenticate(token)).await {
            Ok(Ok(user)) => user,
            Ok(Err(e)) => return Err(SynthesisError::Unauthorized(e.to_string())),
            Err(_) => {
                return Err(SynthesisError::Unauthorized(format!(
                    "authentication timed out after {}ms",
                    self.read_timeout.as_millis()
                )));
            }
        };

        let (
            profile,
            interests,
            objectives,
            daily_metrics,
            recent_sessions,
            habit_entries,
            body_metrics,
            events,
            legacy_facts,
            structured_facts,
            session_snapshots,
            topics,
            streaks,
        ) = tokio::join!(
            self.timed(SourceDomain::Profile, source.profile(&user)),
            self.timed(SourceDomain::Interests, source.interests(&user)),
            self.timed(SourceDomain::Objectives, source.objectives(&user)),
            self.timed(SourceDomain::DailyMetrics, source.daily_metrics(&user, today)),
            self.timed(
                SourceDomain::RecentSessions,
                source.recent_sessions(&user, self.session_limit)
            ),
            self.timed(SourceDomain::HabitEntries, source.habit_entries(&user, today)),
            self.timed(SourceDomain::BodyMetrics, source.latest_body_metrics(&user)),
            self.timed(SourceDomain::Events, source.events(&user)),
            self.timed(SourceDomain::LegacyFacts, source.legacy_facts(&user)),
            self.timed(SourceDomain::StructuredFacts, source.structured_facts(&user)),
            self.timed(
                SourceDomain::SessionSnapshots,
                source.session_snapshots(&user, self.snapshot_limit)
            ),
            self.timed(SourceDomain::TopicRegistry, source.topic_registry(&user)),
            self.timed(SourceDomain::HabitStreaks, source.habit_streaks(&user)),
        );

        let mut failed = Vec::new();
        let mut snapshot = UserSnapshot {
            user_id: user,
            profile: settle(SourceDomain::Profile, profile, &mut failed),
            interests: settle(SourceDomain::Interests, interests, &mut failed),
            objectives: settle(SourceDomain::Objectives, objectives, &mut failed),
            daily_metrics: settle(SourceDomain::DailyMetrics, daily_metrics, &mut failed),
            recent_sessions: settle(SourceDomain::RecentSessions, recent_sessions, &mut failed),
            habit_entries: settle(SourceDomain::HabitEntries, habit_entries, &mut failed),
            body_metrics: settle(SourceDomain::BodyMetrics, body_metrics, &mut failed),
            events: settle(SourceDomain::Events, events, &mut failed),
            legacy_facts: settle(SourceDomain::LegacyFacts, legacy_facts, &mut failed),
            structured_facts: settle(SourceDomain::StructuredFacts, structured_facts, &mut failed),
            session_snapshots: settle(SourceDomain::SessionSnapshots, session_snapshots, &mut failed),
            topics: settle(SourceDomain::TopicRegistry, topics, &mut failed),
            streaks: settle(SourceDomain::HabitStreaks, streaks, &mut failed),
            failed_sources: Vec::new(),
        };
        // Readers promise newest-first; don't rely on it.
        snapshot
            .recent_sessions
            .sort_by(|a, b| b.started_at.cmp(&a.started_at));
        snapshot.failed_sources = failed;

        debug!(
            user = %user,
            source = source.name(),
            failed = snapshot.failed_sources.len(),
            "Snapshot collected"
        );

        Ok(snapshot)
    }

    async fn timed<T, F>(&self, domain: SourceDomain, read: F) -> std::result::Result<T, SourceError>
    where
        F: Future<Output = std::result::Result<T, SourceError>>,
    {
        match tokio::time::timeout(self.read_timeout, read).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                domain,
                after_ms: self.read_timeout.as_millis() as u64,
            }),
        }
    }
}

/// Unwrap a read, substituting the domain default on failure.
fn settle<T: Default>(
    domain: SourceDomain,
    result: std::result::Result<T, SourceError>,
    failed: &mut Vec<SourceDomain>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(domain = %domain, error = %e, "Source read failed, using empty default");
            failed.push(domain);
            T::default()
        }
    }
}
