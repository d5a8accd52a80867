//! Priority budget packing: the step that enforces the hard size limit.
//!
//! Fragments carry a [`Tier`]. The packer stable-sorts them by tier only,
//! then walks them in order and keeps every fragment that still fits. A
//! fragment that doesn't fit is dropped, but smaller ones after it may
//! still get in. Fragments tagged with a section get a heading line the
//! first time their section appears.
//!
//! # Guarantee
//!
//! `PackedContext::len <= budget`, always. If the greedy pass still ends up
//! over budget (a single fragment larger than the whole budget), the
//! joined text is hard-truncated with an ellipsis. That is reported through
//! [`PackReport::truncated`], never as an error.
//!
//! # Determinism
//!
//! No time-dependent or random logic: identical fragments produce
//! byte-identical output.

use serde::Serialize;
use tracing::debug;

use crate::cost::{char_cost, truncate_with_ellipsis};

/// Priority bucket of a fragment. Earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Temporal,
    Identity,
    Guardrail,
    Style,
    Goals,
    Facts,
    DailyState,
    Streaks,
}

/// A candidate piece of the briefing.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFragment {
    pub text: String,
    pub tier: Tier,
    /// Character cost of `text` alone.
    pub cost: usize,
    /// Heading printed once above the first kept fragment of the section.
    pub section: Option<&'static str>,
}

impl ContextFragment {
    pub fn new(tier: Tier, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            cost: char_cost(&text),
            text,
            tier,
            section: None,
        }
    }

    pub fn in_section(mut self, heading: &'static str) -> Self {
        self.section = Some(heading);
        self
    }
}

/// A fragment the packer left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropInfo {
    pub tier: Tier,
    /// Characters the fragment would have added, separators included.
    pub cost: usize,
}

/// What the packer did with the budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackReport {
    pub budget: usize,
    pub used: usize,
    pub kept: usize,
    pub dropped: Vec<DropInfo>,
    /// The greedy pass overflowed and the text was hard-truncated.
    pub truncated: bool,
}

/// The final briefing string.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedContext {
    pub text: String,
    /// Length of `text` in characters.
    pub len: usize,
    pub report: PackReport,
}

/// Greedy packer for a fixed character budget. Stateless, reusable.
#[derive(Debug, Clone, Copy)]
pub struct BudgetPacker {
    budget: usize,
}

impl BudgetPacker {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn pack(&self, mut fragments: Vec<ContextFragment>) -> PackedContext {
        fragments.retain(|f| !f.text.trim().is_empty());
        // Stable: equal tiers keep their input order.
        fragments.sort_by_key(|f| f.tier);

        let mut lines: Vec<String> = Vec::new();
        let mut used = 0;
        let mut kept = 0;
        let mut dropped = Vec::new();
        let mut open_section: Option<&'static str> = None;

        for fragment in fragments {
            let heading = fragment.section.filter(|s| open_section != Some(*s));
            let mut added = fragment.cost;
            let mut new_lines = usize::from(!lines.is_empty());
            if let Some(h) = heading {
                added += char_cost(h);
                new_lines += 1;
            }
            added += new_lines;

            // The first fragment is always taken; truncation bounds it.
            if lines.is_empty() || used + added <= self.budget {
                if let Some(h) = heading {
                    lines.push(h.to_string());
                }
                lines.push(fragment.text);
                open_section = fragment.section;
                used += added;
                kept += 1;
            } else {
                dropped.push(DropInfo {
                    tier: fragment.tier,
                    cost: added,
                });
            }
        }

        let mut text = lines.join("\n");
        let mut truncated = false;
        if char_cost(&text) > self.budget {
            truncated = true;
            text = truncate_with_ellipsis(&text, self.budget);
            debug!(budget = self.budget, "Packed context over budget, truncated");
        }
        let len = char_cost(&text);

        debug!(
            budget = self.budget,
            used = len,
            kept,
            dropped = dropped.len(),
            "Context packed"
        );

        PackedContext {
            text,
            len,
            report: PackReport {
                budget: self.budget,
                used: len,
                kept,
                dropped,
                truncated,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(tier: Tier, text: &str) -> ContextFragment {
        ContextFragment::new(tier, text)
    }

    #[test]
    fn empty_input_packs_to_empty() {
        let packed = BudgetPacker::new(100).pack(vec![]);
        assert_eq!(packed.text, "");
        assert_eq!(packed.len, 0);
        assert!(!packed.report.truncated);
    }

    #[test]
    fn tiers_sorted_input_order_kept_within_tier() {
        let packed = BudgetPacker::new(800).pack(vec![
            frag(Tier::Facts, "fact one"),
            frag(Tier::Temporal, "now"),
            frag(Tier::Facts, "fact two"),
            frag(Tier::Identity, "who"),
            frag(Tier::Facts, "fact three"),
        ]);
        assert_eq!(packed.text, "now\nwho\nfact one\nfact two\nfact three");
        assert_eq!(packed.report.kept, 5);
    }

    #[test]
    fn lower_tiers_dropped_first() {
        let packed = BudgetPacker::new(20).pack(vec![
            frag(Tier::Streaks, "streak: 5 days"),
            frag(Tier::Temporal, "Now: Monday"),
        ]);
        assert_eq!(packed.text, "Now: Monday");
        assert_eq!(
            packed.report.dropped,
            vec![DropInfo {
                tier: Tier::Streaks,
                cost: 15
            }]
        );
    }

    #[test]
    fn smaller_fragment_fits_after_a_drop() {
        let packed = BudgetPacker::new(20).pack(vec![
            frag(Tier::Temporal, "0123456789"),
            frag(Tier::Facts, "far too long to fit here"),
            frag(Tier::Facts, "tiny"),
        ]);
        assert_eq!(packed.text, "0123456789\ntiny");
        assert_eq!(packed.report.dropped.len(), 1);
    }

    #[test]
    fn section_heading_printed_once() {
        let packed = BudgetPacker::new(800).pack(vec![
            frag(Tier::Facts, "- a").in_section("Known:"),
            frag(Tier::Facts, "- b").in_section("Known:"),
            frag(Tier::DailyState, "Mood 6/10"),
        ]);
        assert_eq!(packed.text, "Known:\n- a\n- b\nMood 6/10");
    }

    #[test]
    fn heading_cost_counts_against_budget() {
        // "x" plus newline plus "Heading:" plus newline plus "- a" is 14.
        let tight = BudgetPacker::new(13).pack(vec![
            frag(Tier::Temporal, "x"),
            frag(Tier::Facts, "- a").in_section("Heading:"),
        ]);
        assert_eq!(tight.text, "x");
        let exact = BudgetPacker::new(14).pack(vec![
            frag(Tier::Temporal, "x"),
            frag(Tier::Facts, "- a").in_section("Heading:"),
        ]);
        assert_eq!(exact.len, 14);
    }

    #[test]
    fn oversized_first_fragment_truncated() {
        let huge = "z".repeat(2000);
        let packed = BudgetPacker::new(800).pack(vec![frag(Tier::Temporal, &huge)]);
        assert!(packed.report.truncated);
        assert_eq!(packed.len, 800);
        assert!(packed.text.ends_with("..."));
    }

    #[test]
    fn blank_fragments_ignored() {
        let packed = BudgetPacker::new(50).pack(vec![frag(Tier::Temporal, "  "), frag(Tier::Style, "calm")]);
        assert_eq!(packed.text, "calm");
    }

    #[test]
    fn never_exceeds_budget() {
        for budget in [64usize, 100, 250, 800] {
            let fragments: Vec<ContextFragment> = (0..120)
                .map(|i| {
                    let tier = match i % 4 {
                        0 => Tier::Facts,
                        1 => Tier::Goals,
                        2 => Tier::Streaks,
                        _ => Tier::DailyState,
                    };
                    frag(tier, &"é".repeat(i % 37 + 1))
                })
                .collect();
            let packed = BudgetPacker::new(budget).pack(fragments);
            assert!(packed.len <= budget, "budget {budget}");
            assert_eq!(packed.len, packed.text.chars().count());
        }
    }

    #[test]
    fn packing_is_deterministic() {
        let input = vec![
            frag(Tier::Goals, "goal"),
            frag(Tier::Temporal, "now"),
            frag(Tier::Facts, "fact").in_section("Facts:"),
        ];
        let packer = BudgetPacker::new(30);
        assert_eq!(packer.pack(input.clone()), packer.pack(input));
    }
}
