//! Persona style selection: an ordered rule table, first match wins.
//!
//! An explicit support type always beats anything derived from goals or
//! challenges. When nothing matches, the balanced rule applies, so the
//! selector is total.

use kindred_core::domain::{Interests, Profile, SupportType};

/// What a rule looks for.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// The user picked this support type.
    Support(SupportType),
    /// Any goal or challenge containing one of these keywords.
    Keywords(&'static [&'static str]),
    Always,
}

#[derive(Debug, Clone, Copy)]
pub struct StyleRule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub directive: &'static str,
}

pub const RULES: &[StyleRule] = &[
    StyleRule {
        name: "listener",
        trigger: Trigger::Support(SupportType::Listener),
        directive: "Style: listen more than you talk. Reflect feelings back and hold off on advice unless asked.",
    },
    StyleRule {
        name: "advisor",
        trigger: Trigger::Support(SupportType::Advisor),
        directive: "Style: be practical. Offer concrete, small next steps and check which ones feel doable.",
    },
    StyleRule {
        name: "challenger",
        trigger: Trigger::Support(SupportType::Challenger),
        directive: "Style: be direct. Gently question unhelpful beliefs and hold them to their own goals.",
    },
    StyleRule {
        name: "comforter",
        trigger: Trigger::Support(SupportType::Comforter),
        directive: "Style: be warm and reassuring. Validate first and keep the pace slow.",
    },
    StyleRule {
        name: "anxiety",
        trigger: Trigger::Keywords(&["anxiety", "anxious", "stress", "panic", "worry"]),
        directive: "Style: calm and grounding. Slow the conversation down and offer breathing or grounding when tension shows.",
    },
    StyleRule {
        name: "growth",
        trigger: Trigger::Keywords(&["energy", "growth", "motivation", "productivity", "fitness"]),
        directive: "Style: upbeat and encouraging. Celebrate progress and help turn intentions into action.",
    },
    StyleRule {
        name: "relational",
        trigger: Trigger::Keywords(&["relationship", "family", "partner", "friends", "social"]),
        directive: "Style: curious about the people in their life. Help them see each side of a conflict.",
    },
    StyleRule {
        name: "sleep",
        trigger: Trigger::Keywords(&["sleep", "insomnia", "bedtime"]),
        directive: "Style: soft and unhurried. Notice sleep patterns and suggest wind-down routines.",
    },
    StyleRule {
        name: "burnout",
        trigger: Trigger::Keywords(&["burnout", "burn_out", "overwork", "exhaust"]),
        directive: "Style: protective of their energy. Encourage boundaries and permission to rest.",
    },
    StyleRule {
        name: "self_esteem",
        trigger: Trigger::Keywords(&["self_esteem", "self-esteem", "confidence", "self_worth"]),
        directive: "Style: affirming. Point out their strengths with specific evidence from what they share.",
    },
    StyleRule {
        name: "loneliness",
        trigger: Trigger::Keywords(&["lonely", "loneliness", "isolation", "connection"]),
        directive: "Style: present and companionable. Show you remember them and make small talk feel easy.",
    },
    StyleRule {
        name: "balanced",
        trigger: Trigger::Always,
        directive: "Style: warm, curious and balanced. Mix listening with light suggestions.",
    },
];

impl StyleRule {
    fn matches(&self, support: Option<SupportType>, signals: &[String]) -> bool {
        match self.trigger {
            Trigger::Support(kind) => support == Some(kind),
            Trigger::Keywords(words) => signals
                .iter()
                .any(|s| words.iter().any(|w| s.contains(w))),
            Trigger::Always => true,
        }
    }
}

/// The first rule matching this user.
pub fn select_rule(profile: &Profile, interests: &Interests) -> &'static StyleRule {
    let support = interests.preferences.support_type;
    let signals: Vec<String> = profile
        .selected_goals
        .iter()
        .chain(interests.preferences.challenges.iter())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    RULES
        .iter()
        .find(|rule| rule.matches(support, &signals))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// The style directive for this user. Never empty.
pub fn select_style(profile: &Profile, interests: &Interests) -> &'static str {
    select_rule(profile, interests).directive
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::domain::Preferences;

    fn with_goals(goals: &[&str]) -> Profile {
        Profile {
            selected_goals: goals.iter().map(|g| g.to_string()).collect(),
            ..Profile::default()
        }
    }

    fn with_support(kind: SupportType) -> Interests {
        Interests {
            preferences: Preferences {
                support_type: Some(kind),
                ..Preferences::default()
            },
            ..Interests::default()
        }
    }

    #[test]
    fn nothing_known_is_balanced() {
        let rule = select_rule(&Profile::default(), &Interests::default());
        assert_eq!(rule.name, "balanced");
    }

    #[test]
    fn each_support_type_has_its_rule() {
        let cases = [
            (SupportType::Listener, "listener"),
            (SupportType::Advisor, "advisor"),
            (SupportType::Challenger, "challenger"),
            (SupportType::Comforter, "comforter"),
        ];
        for (kind, name) in cases {
            assert_eq!(select_rule(&Profile::default(), &with_support(kind)).name, name);
        }
    }

    #[test]
    fn support_type_beats_goals() {
        let rule = select_rule(&with_goals(&["reduce_anxiety"]), &with_support(SupportType::Advisor));
        assert_eq!(rule.name, "advisor");
    }

    #[test]
    fn goal_keywords_pick_rules() {
        let cases = [
            ("reduce_anxiety", "anxiety"),
            ("more_energy", "growth"),
            ("Improve relationships", "relational"),
            ("better_sleep", "sleep"),
            ("recover_from_burnout", "burnout"),
            ("build_self_esteem", "self_esteem"),
            ("feel_less_lonely", "loneliness"),
        ];
        for (goal, name) in cases {
            assert_eq!(
                select_rule(&with_goals(&[goal]), &Interests::default()).name,
                name,
                "{goal}"
            );
        }
    }

    #[test]
    fn challenges_count_as_signals() {
        let interests = Interests {
            preferences: Preferences {
                challenges: vec!["Insomnia".into()],
                ..Preferences::default()
            },
            ..Interests::default()
        };
        assert_eq!(select_rule(&Profile::default(), &interests).name, "sleep");
    }

    #[test]
    fn earlier_rule_wins_between_goals() {
        let profile = with_goals(&["better_sleep", "reduce_stress"]);
        assert_eq!(select_rule(&profile, &Interests::default()).name, "anxiety");
    }

    #[test]
    fn every_directive_is_non_empty() {
        assert!(RULES.iter().all(|r| !r.directive.trim().is_empty()));
        assert!(matches!(RULES[RULES.len() - 1].trigger, Trigger::Always));
    }
}
