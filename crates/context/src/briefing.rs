//! Fragment builders: one per kind of line in the briefing.
//!
//! Each builder renders a piece of the snapshot (or a derived signal) into
//! [`ContextFragment`]s tagged with their tier. [`build_fragments`] gathers
//! them all in a fixed order for the packer.

use chrono::{DateTime, FixedOffset};
use kindred_core::domain::{BodyMetrics, DailyMetrics, HabitEntry, HabitStreak, Objective};

use crate::fusion::FusedFacts;
use crate::packer::{ContextFragment, Tier};
use crate::snapshot::UserSnapshot;
use crate::temporal::{EventSignal, LastContact, day_part};

/// Heading above the plain fact list.
pub const FACTS_HEADING: &str = "What you know about them:";

/// Everything the briefing is built from, already derived.
#[derive(Debug, Clone)]
pub struct BriefingInput<'a> {
    pub snapshot: &'a UserSnapshot,
    pub now: DateTime<FixedOffset>,
    pub display_name: Option<&'a str>,
    pub last_contact: LastContact,
    pub last_mood: Option<String>,
    pub events: &'a [EventSignal],
    pub style: &'static str,
    pub facts: &'a FusedFacts,
    /// Minimum current streak worth highlighting.
    pub streak_min: u32,
}

pub fn build_fragments(input: &BriefingInput<'_>) -> Vec<ContextFragment> {
    let snapshot = input.snapshot;
    let mut fragments = vec![
        timestamp(input.now),
        ContextFragment::new(Tier::Temporal, input.last_contact.directive()),
    ];
    if let Some(mood) = &input.last_mood {
        fragments.push(ContextFragment::new(Tier::Temporal, mood.as_str()));
    }
    fragments.extend(
        input
            .events
            .iter()
            .map(|e| ContextFragment::new(Tier::Temporal, e.render())),
    );

    fragments.push(identity(snapshot, input.display_name, input.now));
    fragments.push(ContextFragment::new(Tier::Style, input.style));
    fragments.extend(goals(snapshot));
    fragments.extend(facts(input.facts));
    fragments.extend(daily_state(snapshot));
    fragments.extend(streaks(&snapshot.streaks, input.streak_min));
    fragments
}

/// `Now: Saturday, 18 October 2026, 10:30 (morning).`
pub fn timestamp(now: DateTime<FixedOffset>) -> ContextFragment {
    ContextFragment::new(
        Tier::Temporal,
        format!("Now: {} ({}).", now.format("%A, %-d %B %Y, %H:%M"), day_part(now)),
    )
}

/// Who the user is, as far as the profile says. Always present.
pub fn identity(
    snapshot: &UserSnapshot,
    display_name: Option<&str>,
    now: DateTime<FixedOffset>,
) -> ContextFragment {
    let profile = &snapshot.profile;
    let full_name = profile.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let mut name = match (display_name, full_name) {
        (Some(shown), Some(full)) if !full.eq_ignore_ascii_case(shown) && !full.starts_with(shown) => {
            format!("{shown} ({full})")
        }
        (Some(shown), _) => shown.to_string(),
        (None, Some(full)) => full.to_string(),
        (None, None) => "name not shared yet".to_string(),
    };

    let mut details = Vec::new();
    if let Some(age) = profile.age_on(now.date_naive()) {
        details.push(age.to_string());
    }
    for field in [&profile.gender, &profile.occupation] {
        if let Some(value) = field.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            details.push(value.to_string());
        }
    }
    if !details.is_empty() {
        name.push_str(", ");
        name.push_str(&details.join(", "));
    }
    ContextFragment::new(Tier::Identity, format!("User: {name}."))
}

/// Goals, interests, challenges and tracked objectives.
pub fn goals(snapshot: &UserSnapshot) -> Vec<ContextFragment> {
    let profile = &snapshot.profile;
    let prefs = &snapshot.interests.preferences;
    let mut out = Vec::new();

    let goal_list = humanize_list(&profile.selected_goals);
    let goal_line = if goal_list.is_empty() {
        "Goals: not shared yet.".to_string()
    } else {
        format!("Goals: {goal_list}.")
    };
    out.push(ContextFragment::new(Tier::Goals, goal_line));

    for (label, items) in [("Challenges", &prefs.challenges), ("Interests", &prefs.interests)] {
        let list = humanize_list(items);
        if !list.is_empty() {
            out.push(ContextFragment::new(Tier::Goals, format!("{label}: {list}.")));
        }
    }

    out.extend(
        snapshot
            .objectives
            .iter()
            .filter_map(objective_line)
            .map(|line| ContextFragment::new(Tier::Goals, line)),
    );
    out
}

fn objective_line(objective: &Objective) -> Option<String> {
    let title = objective.title.trim();
    if title.is_empty() {
        return None;
    }
    let unit = objective
        .unit
        .as_deref()
        .map(|u| format!(" {}", u.trim()))
        .unwrap_or_default();
    let progress = match (objective.current_value, objective.target_value) {
        (Some(current), Some(target)) => {
            let mut p = format!("{}/{}{unit}", number(current), number(target));
            if let Some(pct) = objective.progress_pct() {
                p.push_str(&format!(", {pct}%"));
            }
            format!(" ({p})")
        }
        (None, Some(target)) => format!(" (target {}{unit})", number(target)),
        _ => String::new(),
    };
    Some(format!("Objective: {title}{progress}."))
}

/// Plain facts under one heading, then the session recap. The sensitivity
/// guardrail goes in its own tier.
pub fn facts(fused: &FusedFacts) -> Vec<ContextFragment> {
    fused
        .ordered()
        .into_iter()
        .map(|f| {
            if fused.guardrail.as_ref() == Some(f) {
                ContextFragment::new(Tier::Guardrail, f.text())
            } else if f.is_derived() {
                ContextFragment::new(Tier::Facts, f.text())
            } else {
                ContextFragment::new(Tier::Facts, format!("- {}", f.text())).in_section(FACTS_HEADING)
            }
        })
        .collect()
}

/// Today's check-in, habits, body metrics and life-area scores.
pub fn daily_state(snapshot: &UserSnapshot) -> Vec<ContextFragment> {
    let profile = &snapshot.profile;
    let lines = [
        metrics_line(&snapshot.daily_metrics),
        habits_line(&snapshot.habit_entries),
        body_line(&snapshot.body_metrics),
        (!profile.life_area_scores.is_empty()).then(|| {
            let areas: Vec<String> = profile
                .life_area_scores
                .iter()
                .map(|(area, score)| format!("{} {}/10", humanize(area), number(f64::from(*score))))
                .collect();
            format!("Life areas: {}.", areas.join(", "))
        }),
    ];
    lines
        .into_iter()
        .flatten()
        .map(|line| ContextFragment::new(Tier::DailyState, line))
        .collect()
}

fn metrics_line(metrics: &DailyMetrics) -> Option<String> {
    if metrics.is_empty() {
        return None;
    }
    let parts: Vec<String> = [
        ("mood", metrics.mood),
        ("anxiety", metrics.anxiety),
        ("energy", metrics.energy),
        ("sleep", metrics.sleep),
    ]
    .into_iter()
    .filter_map(|(label, score)| score.map(|s| format!("{label} {s}/10")))
    .collect();
    Some(format!("Today: {}.", parts.join(", ")))
}

fn habits_line(entries: &[HabitEntry]) -> Option<String> {
    let parts: Vec<String> = entries
        .iter()
        .filter(|e| !e.habit_type.trim().is_empty())
        .map(|e| {
            let mut part = humanize(&e.habit_type);
            if let Some(value) = e.value {
                part.push(' ');
                part.push_str(&number(value));
                if let Some(unit) = e.unit.as_deref().filter(|u| !u.trim().is_empty()) {
                    part.push(' ');
                    part.push_str(unit.trim());
                }
            }
            if e.completed {
                part.push_str(" (done)");
            }
            part
        })
        .collect();
    (!parts.is_empty()).then(|| format!("Habits today: {}.", parts.join(", ")))
}

fn body_line(body: &BodyMetrics) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    if let Some(w) = body.weight_kg {
        parts.push(format!("{} kg", number(w)));
    }
    if let Some(f) = body.body_fat_pct {
        parts.push(format!("{}% body fat", number(f)));
    }
    if let Some(hr) = body.resting_heart_rate {
        parts.push(format!("resting HR {hr}"));
    }
    if let Some(steps) = body.steps {
        parts.push(format!("{steps} steps"));
    }
    Some(format!("Body: {}.", parts.join(", ")))
}

/// Habits on a streak of at least `min` days, longest first.
pub fn streaks(streaks: &[HabitStreak], min: u32) -> Option<ContextFragment> {
    let mut hot: Vec<&HabitStreak> = streaks
        .iter()
        .filter(|s| s.current_streak >= min && !s.habit_type.trim().is_empty())
        .collect();
    if hot.is_empty() {
        return None;
    }
    hot.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
    let parts: Vec<String> = hot
        .iter()
        .map(|s| {
            let mut part = format!("{} {} days", humanize(&s.habit_type), s.current_streak);
            if s.longest_streak > s.current_streak {
                part.push_str(&format!(" (best {})", s.longest_streak));
            }
            part
        })
        .collect();
    Some(ContextFragment::new(
        Tier::Streaks,
        format!("Streaks: {}.", parts.join(", ")),
    ))
}

/// `reduce_anxiety` → `reduce anxiety`.
fn humanize(key: &str) -> String {
    key.trim().replace(['_', '-'], " ")
}

fn humanize_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| humanize(i))
        .filter(|i| !i.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whole numbers without a decimal point, others with one.
fn number(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
