//! Fact fusion: reconcile the structured and legacy fact stores at read time.
//!
//! Both stores stay independently writable elsewhere, so the same fact can
//! live in both. Fusion renders structured facts with their category label,
//! drops legacy entries that repeat a structured fact (case-insensitively),
//! caps the list, and appends two derived blocks: a recent-session summary
//! and a guardrail naming topics that must not be raised proactively.
//!
//! # Ordering
//!
//! Structured facts come first, sorted by importance then recency (both
//! descending, stable for ties). Legacy facts follow in stored order.
//! Capping cuts from the tail, so the least important facts go first.

use kindred_core::domain::{SessionSnapshot, StructuredFact, TopicMention};
use kindred_core::fact::{Fact, FactCategory, FactSource};
use std::collections::HashSet;

use crate::snapshot::UserSnapshot;

/// Caps applied during fusion.
#[derive(Debug, Clone, Copy)]
pub struct FusionLimits {
    pub max_facts: usize,
    pub session_summary_limit: usize,
}

impl Default for FusionLimits {
    fn default() -> Self {
        Self {
            max_facts: 60,
            session_summary_limit: 3,
        }
    }
}

/// Output of fusion: plain facts plus the two derived blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusedFacts {
    /// Deduplicated, ordered, capped.
    pub facts: Vec<Fact>,
    pub session_summary: Option<Fact>,
    pub guardrail: Option<Fact>,
}

impl FusedFacts {
    /// The full ordered list: plain facts, then the summary, then the guardrail.
    pub fn ordered(&self) -> Vec<&Fact> {
        self.facts
            .iter()
            .chain(self.session_summary.iter())
            .chain(self.guardrail.iter())
            .collect()
    }
}

/// Merge both fact stores of a snapshot into one deduplicated list.
pub fn fuse_facts(snapshot: &UserSnapshot, limits: &FusionLimits) -> FusedFacts {
    let mut seen: HashSet<String> = HashSet::new();
    let mut facts = Vec::new();

    let mut structured: Vec<&StructuredFact> = snapshot.structured_facts.iter().collect();
    structured.sort_by(|a, b| {
        b.importance
            .cmp(&a.importance)
            .then_with(|| b.last_referenced_at.cmp(&a.last_referenced_at))
    });

    for row in structured {
        let raw_key = normalize(&row.text);
        if raw_key.is_empty() || seen.contains(&raw_key) {
            continue;
        }
        let (rendered, category) = render_structured(row);
        let rendered_key = normalize(&rendered);
        if seen.contains(&rendered_key) {
            continue;
        }
        let Some(fact) = Fact::new(rendered, FactSource::Structured) else {
            continue;
        };
        seen.insert(raw_key);
        seen.insert(rendered_key);
        facts.push(
            fact.with_category(category)
                .with_importance(row.importance)
                .with_recency(row.last_referenced_at),
        );
    }

    for text in &snapshot.legacy_facts {
        let key = normalize(text);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        if let Some(fact) = Fact::new(text.as_str(), FactSource::Legacy) {
            facts.push(fact);
        }
    }

    facts.truncate(limits.max_facts);

    FusedFacts {
        facts,
        session_summary: session_summary(&snapshot.session_snapshots, limits.session_summary_limit),
        guardrail: sensitivity_guardrail(&snapshot.topics),
    }
}

/// Render a structured row with its category prefix.
///
/// Known categories use their fixed label; unknown ones get a bracket label
/// built from the stored name (`travel_plans` → `[Travel plans]`).
pub fn render_structured(row: &StructuredFact) -> (String, Option<FactCategory>) {
    let text = row.text.trim();
    if let Some(category) = FactCategory::parse(&row.category) {
        return (format!("{}: {}", category.label(), text), Some(category));
    }
    match bracket_label(&row.category) {
        Some(label) => (format!("[{label}] {text}"), None),
        None => (text.to_string(), None),
    }
}

fn bracket_label(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect();
    let joined = words.join(" ").to_lowercase();
    let mut chars = joined.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Case- and whitespace-insensitive comparison key.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Multi-line recap of the most recent session summaries.
pub fn session_summary(snapshots: &[SessionSnapshot], limit: usize) -> Option<Fact> {
    let mut recent: Vec<&SessionSnapshot> = snapshots
        .iter()
        .filter(|s| s.needs_follow_up || !s.topics.is_empty() || !s.unresolved_issues.is_empty())
        .collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(limit);
    if recent.is_empty() {
        return None;
    }

    let mut block = String::from("Recent sessions:");
    for s in recent {
        block.push_str(&format!("\n- {}", s.created_at.format("%b %-d")));
        if !s.topics.is_empty() {
            block.push_str(&format!(": talked about {}", s.topics.join(", ")));
        }
        if !s.unresolved_issues.is_empty() {
            block.push_str(&format!("; unresolved: {}", s.unresolved_issues.join(", ")));
        }
        if s.needs_follow_up {
            block.push_str(" [follow up]");
        }
    }
    Fact::new(block, FactSource::Derived)
}

/// Instruction naming every guarded topic, or `None` when there are none.
pub fn sensitivity_guardrail(topics: &[TopicMention]) -> Option<Fact> {
    let mut seen = HashSet::new();
    let names: Vec<&str> = topics
        .iter()
        .filter(|t| t.is_guarded())
        .map(|t| t.topic.trim())
        .filter(|name| !name.is_empty() && seen.insert(name.to_lowercase()))
        .collect();
    if names.is_empty() {
        return None;
    }
    Fact::new(
        format!(
            "Sensitive topics: never bring up {} unless the user raises it first.",
            names.join(", ")
        ),
        FactSource::Derived,
    )
}
