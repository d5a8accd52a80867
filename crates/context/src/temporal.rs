//! Temporal salience: turn timestamps into conversational signals.
//!
//! Everything here is a pure function of the inputs and an explicit `now`.
//! Nothing reads the wall clock.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Timelike, Utc};
use kindred_config::{RecencyConfig, SynthesisConfig};
use kindred_core::domain::{EventStatus, SessionRecord, UserEvent};

// ── Last contact ──────────────────────────────────────────────────────────

/// How long ago the user last talked to the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastContact {
    /// No prior session at all.
    FirstContact,
    JustSpoke,
    ShortBreak,
    Normal,
    Gap,
    LongAbsence,
}

impl LastContact {
    /// Instruction for the companion matching this band.
    pub fn directive(self) -> &'static str {
        match self {
            Self::FirstContact => {
                "This is your first conversation: introduce yourself and ask one gentle question to get to know them."
            }
            Self::JustSpoke => {
                "You spoke moments ago: skip greetings and introductions and pick up where you left off."
            }
            Self::ShortBreak => "You spoke earlier today: keep the welcome back short.",
            Self::Normal => "Greet them naturally, without re-introducing yourself.",
            Self::Gap => "It has been a few days since you last spoke: acknowledge the gap naturally.",
            Self::LongAbsence => {
                "It has been a long time since you last spoke: give a warm welcome back, without guilt."
            }
        }
    }
}

/// Band edges, in minutes since the last session.
#[derive(Debug, Clone, Copy)]
pub struct RecencyBands {
    pub just_spoke: i64,
    pub short_break: i64,
    pub gap: i64,
    pub long_absence: i64,
}

impl RecencyBands {
    pub fn from_config(config: &RecencyConfig) -> Self {
        Self {
            just_spoke: config.just_spoke_minutes,
            short_break: config.short_break_minutes,
            gap: config.gap_minutes().unwrap_or(i64::MAX),
            long_absence: config.long_absence_minutes().unwrap_or(i64::MAX),
        }
    }
}

impl Default for RecencyBands {
    fn default() -> Self {
        Self::from_config(&RecencyConfig::default())
    }
}

/// Time since the most recent session ended (or started, if it has no end).
/// Clock skew never yields a negative span.
pub fn elapsed_since_last(sessions: &[SessionRecord], now: DateTime<FixedOffset>) -> Option<Duration> {
    let last = sessions.iter().map(SessionRecord::last_activity).max()?;
    let elapsed = now.with_timezone(&Utc) - last;
    Some(elapsed.max(Duration::zero()))
}

pub fn classify_last_contact(
    sessions: &[SessionRecord],
    now: DateTime<FixedOffset>,
    bands: &RecencyBands,
) -> LastContact {
    let Some(elapsed) = elapsed_since_last(sessions, now) else {
        return LastContact::FirstContact;
    };
    let minutes = elapsed.num_minutes();
    if minutes < bands.just_spoke {
        LastContact::JustSpoke
    } else if minutes < bands.short_break {
        LastContact::ShortBreak
    } else if minutes < bands.gap {
        LastContact::Normal
    } else if minutes <= bands.long_absence {
        LastContact::Gap
    } else {
        LastContact::LongAbsence
    }
}

/// Mood score and up to `max_tags` emotion tags of the most recent session.
pub fn last_session_mood(sessions: &[SessionRecord], max_tags: usize) -> Option<String> {
    let last = sessions.iter().max_by_key(|s| s.last_activity())?;
    let tags: Vec<&str> = last
        .emotion_tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(max_tags)
        .collect();

    match (last.mood_score, tags.is_empty()) {
        (Some(score), true) => Some(format!("Mood last session: {score}/10.")),
        (Some(score), false) => Some(format!("Mood last session: {score}/10 ({}).", tags.join(", "))),
        (None, false) => Some(format!("Emotions last session: {}.", tags.join(", "))),
        (None, true) => None,
    }
}

// ── Events ────────────────────────────────────────────────────────────────

/// A dated event close enough to now to mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSignal {
    /// Happened within the window and nobody has followed up yet.
    JustHappened { title: String, ago: Duration },
    UpcomingSoon {
        title: String,
        location: Option<String>,
        remaining: Duration,
    },
}

impl EventSignal {
    pub fn render(&self) -> String {
        match self {
            Self::JustHappened { title, ago } => {
                format!("\"{title}\" happened {} ago: ask how it went.", format_span(*ago))
            }
            Self::UpcomingSoon {
                title,
                location: Some(location),
                remaining,
            } => format!("Coming up in {}: \"{title}\" at {location}.", format_span(*remaining)),
            Self::UpcomingSoon {
                title,
                location: None,
                remaining,
            } => format!("Coming up in {}: \"{title}\".", format_span(*remaining)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventWindow {
    /// Follow-up span on either side of now.
    pub span: Duration,
    /// Events considered, closest first.
    pub max_considered: usize,
    /// Signals emitted.
    pub max_emitted: usize,
}

impl EventWindow {
    pub fn from_config(config: &SynthesisConfig) -> Self {
        Self {
            span: Duration::hours(i64::from(config.event_window_hours)),
            max_considered: config.max_events_considered,
            max_emitted: config.max_event_fragments,
        }
    }
}

impl Default for EventWindow {
    fn default() -> Self {
        Self::from_config(&SynthesisConfig::default())
    }
}

/// Events without a time of day are treated as happening at noon.
fn default_event_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Signals for events inside the window, closest first.
///
/// Event dates and times are user-local, so the delta is taken between
/// naive local times. Cancelled events are ignored. Ties on distance keep
/// input order.
pub fn event_signals(
    events: &[UserEvent],
    now: DateTime<FixedOffset>,
    window: &EventWindow,
) -> Vec<EventSignal> {
    let local_now = now.naive_local();
    let mut timed: Vec<(Duration, &UserEvent)> = events
        .iter()
        .filter(|e| e.status != EventStatus::Cancelled)
        .map(|e| {
            let at = e.date.and_time(e.time.unwrap_or_else(default_event_time));
            (at - local_now, e)
        })
        .collect();
    timed.sort_by_key(|(delta, _)| delta.abs());

    timed
        .into_iter()
        .take(window.max_considered)
        .filter_map(|(delta, event)| {
            if delta <= Duration::zero() {
                let ago = -delta;
                (ago <= window.span && !event.follow_up_done).then(|| EventSignal::JustHappened {
                    title: event.title.clone(),
                    ago,
                })
            } else {
                (delta <= window.span).then(|| EventSignal::UpcomingSoon {
                    title: event.title.clone(),
                    location: event.location.clone().filter(|l| !l.trim().is_empty()),
                    remaining: delta,
                })
            }
        })
        .take(window.max_emitted)
        .collect()
}

// ── Formatting ────────────────────────────────────────────────────────────

/// Compact human span: `45 min`, `1h 30min`, `3h`, `2 days`.
pub fn format_span(span: Duration) -> String {
    let minutes = span.num_minutes().max(0);
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes / 60;
    if hours < 24 {
        let rest = minutes % 60;
        return if rest == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {rest}min")
        };
    }
    match hours / 24 {
        1 => "1 day".to_string(),
        days => format!("{days} days"),
    }
}

/// Coarse part of the day for a local time.
pub fn day_part(now: DateTime<FixedOffset>) -> &'static str {
    match now.hour() {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=21 => "evening",
        _ => "night",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 10, 30, 0)
            .unwrap()
    }

    fn ended(minutes_ago: i64) -> SessionRecord {
        let end = now().with_timezone(&Utc) - Duration::minutes(minutes_ago);
        SessionRecord {
            started_at: end - Duration::minutes(20),
            ended_at: Some(end),
            ..SessionRecord::default()
        }
    }

    fn event(title: &str, time: &str) -> UserEvent {
        UserEvent {
            title: title.into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            time: Some(NaiveTime::parse_from_str(time, "%H:%M").unwrap()),
            ..UserEvent::default()
        }
    }

    #[test]
    fn no_sessions_is_first_contact() {
        assert_eq!(
            classify_last_contact(&[], now(), &RecencyBands::default()),
            LastContact::FirstContact
        );
    }

    #[test]
    fn bands_follow_elapsed_time() {
        let bands = RecencyBands::default();
        let cases = [
            (10, LastContact::JustSpoke),
            (29, LastContact::JustSpoke),
            (30, LastContact::ShortBreak),
            (179, LastContact::ShortBreak),
            (180, LastContact::Normal),
            (2 * 24 * 60, LastContact::Normal),
            (3 * 24 * 60, LastContact::Gap),
            (14 * 24 * 60, LastContact::Gap),
            (15 * 24 * 60, LastContact::LongAbsence),
        ];
        for (minutes, expected) in cases {
            assert_eq!(
                classify_last_contact(&[ended(minutes)], now(), &bands),
                expected,
                "{minutes} minutes"
            );
        }
    }

    #[test]
    fn oversized_day_bands_saturate() {
        let config = RecencyConfig {
            long_absence_days: i64::MAX / 10,
            ..RecencyConfig::default()
        };
        let bands = RecencyBands::from_config(&config);
        assert_eq!(bands.gap, 3 * 24 * 60);
        assert_eq!(bands.long_absence, i64::MAX);
        assert_eq!(
            classify_last_contact(&[ended(400 * 24 * 60)], now(), &bands),
            LastContact::Gap
        );
    }

    #[test]
    fn start_time_used_when_no_end() {
        let session = SessionRecord {
            started_at: now().with_timezone(&Utc) - Duration::minutes(5),
            ..SessionRecord::default()
        };
        assert_eq!(
            classify_last_contact(&[session], now(), &RecencyBands::default()),
            LastContact::JustSpoke
        );
    }

    #[test]
    fn future_session_counts_as_just_now() {
        assert_eq!(elapsed_since_last(&[ended(-90)], now()), Some(Duration::zero()));
    }

    #[test]
    fn mood_fact_caps_tags() {
        let mut session = ended(60);
        session.mood_score = Some(6);
        session.emotion_tags = vec!["anxious".into(), "hopeful".into(), " ".into(), "tired".into(), "calm".into()];
        assert_eq!(
            last_session_mood(&[session], 3).as_deref(),
            Some("Mood last session: 6/10 (anxious, hopeful, tired).")
        );
        assert_eq!(last_session_mood(&[ended(60)], 3), None);
    }

    #[test]
    fn past_event_without_follow_up_asks_how_it_went() {
        let events = vec![event("Job interview", "09:00")];
        let signals = event_signals(&events, now(), &EventWindow::default());
        assert_eq!(signals.len(), 1);
        assert_eq!(
            signals[0].render(),
            "\"Job interview\" happened 1h 30min ago: ask how it went."
        );
    }

    #[test]
    fn follow_up_done_silences_past_event() {
        let mut done = event("Job interview", "09:00");
        done.follow_up_done = true;
        assert!(event_signals(&[done], now(), &EventWindow::default()).is_empty());
    }

    #[test]
    fn upcoming_event_names_location_and_time_left() {
        let mut dinner = event("Dinner with Sam", "19:30");
        dinner.location = Some("Luigi's".into());
        let signals = event_signals(&[dinner], now(), &EventWindow::default());
        assert_eq!(signals[0].render(), "Coming up in 9h: \"Dinner with Sam\" at Luigi's.");
    }

    #[test]
    fn missing_time_defaults_to_noon() {
        let mut lunch = event("Lunch", "00:00");
        lunch.time = None;
        let signals = event_signals(&[lunch], now(), &EventWindow::default());
        assert_eq!(
            signals,
            vec![EventSignal::UpcomingSoon {
                title: "Lunch".into(),
                location: None,
                remaining: Duration::minutes(90),
            }]
        );
    }

    #[test]
    fn outside_window_and_cancelled_are_ignored() {
        let far = UserEvent {
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            ..event("Trip", "10:00")
        };
        let mut cancelled = event("Dentist", "11:00");
        cancelled.status = EventStatus::Cancelled;
        assert!(event_signals(&[far, cancelled], now(), &EventWindow::default()).is_empty());
    }

    #[test]
    fn at_most_three_closest_signals() {
        let events = vec![
            event("e1", "20:00"),
            event("e2", "11:00"),
            event("e3", "08:00"),
            event("e4", "12:00"),
            event("e5", "10:00"),
        ];
        let titles: Vec<String> = event_signals(&events, now(), &EventWindow::default())
            .into_iter()
            .map(|s| match s {
                EventSignal::JustHappened { title, .. } | EventSignal::UpcomingSoon { title, .. } => title,
            })
            .collect();
        // e2 and e5 are both 30 minutes away; input order breaks the tie.
        assert_eq!(titles, vec!["e2", "e5", "e4"]);
    }

    #[test]
    fn local_offset_shifts_event_delta() {
        // 10:30 UTC is 12:30 at +02:00, so a 12:00 event is 30 minutes past.
        let local = now().with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        let signals = event_signals(&[event("Standup", "12:00")], local, &EventWindow::default());
        assert_eq!(
            signals,
            vec![EventSignal::JustHappened {
                title: "Standup".into(),
                ago: Duration::minutes(30),
            }]
        );
    }

    #[test]
    fn spans_are_compact() {
        assert_eq!(format_span(Duration::minutes(45)), "45 min");
        assert_eq!(format_span(Duration::minutes(90)), "1h 30min");
        assert_eq!(format_span(Duration::hours(3)), "3h");
        assert_eq!(format_span(Duration::hours(30)), "1 day");
        assert_eq!(format_span(Duration::days(5)), "5 days");
    }

    #[test]
    fn day_parts() {
        assert_eq!(day_part(now()), "morning");
        assert_eq!(day_part(now() + Duration::hours(4)), "afternoon");
        assert_eq!(day_part(now() + Duration::hours(9)), "evening");
        assert_eq!(day_part(now() + Duration::hours(14)), "night");
    }
}
