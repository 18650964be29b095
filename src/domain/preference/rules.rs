//! Static keyword rules mapping patient phrasing to schema dimensions.
//!
//! Phrases are lowercase. Phrases of three characters or fewer only match
//! whole words; longer phrases match at a word start and may run into a
//! suffix ("swim" matches "swimming"). Intensifiers and diminishers always
//! match whole words.

use crate::domain::foundation::Category;

/// Weight given to a plain rule hit.
pub(crate) const BASE_WEIGHT: f64 = 0.7;

/// Weight given when an intensifier shares the clause with a hit.
pub(crate) const INTENSIFIED_WEIGHT: f64 = 1.0;

/// Weight given when a diminisher shares the clause with a hit.
pub(crate) const DIMINISHED_WEIGHT: f64 = 0.2;

/// Minimum weight given to a dimension named by a discussed topic.
pub(crate) const TOPIC_WEIGHT: f64 = 0.6;

pub(crate) const INTENSIFIERS: &[&str] = &[
    "need",
    "must",
    "really",
    "very",
    "essential",
    "important",
    "constantly",
    "always",
    "critical",
    "priority",
    "top",
    "a lot",
];

pub(crate) const DIMINISHERS: &[&str] = &[
    "don't care",
    "do not care",
    "not important",
    "doesn't matter",
    "does not matter",
    "not a concern",
    "not worried",
    "not a big deal",
    "not a priority",
    "less important",
    "don't mind",
];

/// One dimension and the phrases that signal it.
#[derive(Debug)]
pub(crate) struct KeywordRule {
    pub category: Category,
    pub dimension: &'static str,
    pub phrases: &'static [&'static str],
}

pub(crate) static RULES: &[KeywordRule] = &[
    // Cost
    KeywordRule {
        category: Category::Cost,
        dimension: "upfront",
        phrases: &[
            "upfront", "up front", "up-front", "initial cost", "out of pocket",
            "out-of-pocket", "afford", "expensive", "cheap", "budget", "price",
            "deductible",
        ],
    },
    KeywordRule {
        category: Category::Cost,
        dimension: "insurance_coverage",
        phrases: &[
            "insurance", "insurer", "coverage", "covered", "medicare", "medicaid",
            "prior auth",
        ],
    },
    KeywordRule {
        category: Category::Cost,
        dimension: "supply_cost",
        phrases: &[
            "supplies", "supply cost", "refill", "monthly cost", "ongoing cost",
            "cartridge", "copay", "co-pay",
        ],
    },
    KeywordRule {
        category: Category::Cost,
        dimension: "pharmacy_access",
        phrases: &["pharmacy", "drugstore", "cvs", "walgreens", "pick up at"],
    },
    // Lifestyle
    KeywordRule {
        category: Category::Lifestyle,
        dimension: "travel",
        phrases: &[
            "travel", "trip", "airport", "flight", "flying", "vacation",
            "on the road", "abroad",
        ],
    },
    KeywordRule {
        category: Category::Lifestyle,
        dimension: "water_resistance",
        phrases: &[
            "waterproof", "water resistant", "water-resistant", "water", "swim",
            "pool", "beach", "shower", "ocean", "lake", "surf",
        ],
    },
    KeywordRule {
        category: Category::Lifestyle,
        dimension: "physical_activity",
        phrases: &[
            "sport", "exercise", "gym", "run", "running", "runner", "hike", "hiking",
            "workout", "active", "soccer", "basketball", "cycling", "yoga", "athlet",
        ],
    },
    KeywordRule {
        category: Category::Lifestyle,
        dimension: "discretion",
        phrases: &[
            "discreet", "discrete", "hidden", "hide", "noticeable", "visible",
            "under my clothes", "under clothes", "tubing", "tubeless", "small",
        ],
    },
    // Algorithm
    KeywordRule {
        category: Category::Algorithm,
        dimension: "automation",
        phrases: &[
            "automat", "auto-adjust", "hands-off", "hands off", "closed loop",
            "closed-loop", "adjusts itself", "does the work", "do the work",
            "set it and forget",
        ],
    },
    KeywordRule {
        category: Category::Algorithm,
        dimension: "adjustable_targets",
        phrases: &[
            "target", "customiz", "customis", "fine-tune", "fine tune", "tweak",
            "settings", "control over", "in control", "adjust my",
        ],
    },
    KeywordRule {
        category: Category::Algorithm,
        dimension: "exercise_mode",
        phrases: &[
            "exercise mode", "activity mode", "workout mode", "temp target",
            "temporary target", "sleep mode", "during exercise", "during sports",
            "lows when",
        ],
    },
    KeywordRule {
        category: Category::Algorithm,
        dimension: "meal_flexibility",
        phrases: &[
            "forget to bolus", "miss a bolus", "missed bolus", "forget boluses",
            "carb count", "counting carbs", "meals", "snack", "eat", "forgiving",
        ],
    },
    // Ease to start
    KeywordRule {
        category: Category::EaseToStart,
        dimension: "quick_setup",
        phrases: &[
            "quick", "fast", "right away", "asap", "soon", "setup", "set up",
            "get started", "start quickly",
        ],
    },
    KeywordRule {
        category: Category::EaseToStart,
        dimension: "learning_curve",
        phrases: &[
            "learn", "simple", "easy", "intuitive", "overwhelm", "confus",
            "not tech", "complicated",
        ],
    },
    KeywordRule {
        category: Category::EaseToStart,
        dimension: "remote_training",
        phrases: &[
            "training", "trainer", "educator", "online", "video", "virtual",
            "remote", "class", "teach",
        ],
    },
    // Complexity
    KeywordRule {
        category: Category::Complexity,
        dimension: "few_daily_steps",
        phrases: &[
            "simple", "fewer steps", "less work", "hassle", "busy", "routine",
            "daily tasks", "maintenance", "minimal",
        ],
    },
    KeywordRule {
        category: Category::Complexity,
        dimension: "phone_control",
        phrases: &[
            "phone", "app", "apps", "smartphone", "iphone", "android", "watch",
            "bolus from",
        ],
    },
    KeywordRule {
        category: Category::Complexity,
        dimension: "low_alert_burden",
        phrases: &[
            "alarm", "alert", "beep", "notification", "wake me", "woken",
            "interrupt", "buzz", "vibrat",
        ],
    },
    KeywordRule {
        category: Category::Complexity,
        dimension: "few_fingersticks",
        phrases: &[
            "fingerstick", "finger stick", "finger prick", "fingerprick", "calibrat",
            "prick", "poke", "lancet", "cgm",
        ],
    },
    // Support
    KeywordRule {
        category: Category::Support,
        dimension: "manufacturer_support",
        phrases: &[
            "24/7", "support line", "customer service", "call someone", "help line",
            "helpline", "tech support", "someone to call", "support",
        ],
    },
    KeywordRule {
        category: Category::Support,
        dimension: "clinic_familiarity",
        phrases: &[
            "doctor", "clinic", "endo", "care team", "nurse", "provider",
        ],
    },
    KeywordRule {
        category: Category::Support,
        dimension: "peer_community",
        phrases: &[
            "community", "other users", "facebook", "forum", "reddit", "group",
            "peer", "others using",
        ],
    },
    KeywordRule {
        category: Category::Support,
        dimension: "replacement_speed",
        phrases: &[
            "replace", "broken", "breaks", "backup", "loaner", "shipping",
            "overnight", "warranty",
        ],
    },
];

/// Rules for one category, in table order.
pub(crate) fn rules_for(category: Category) -> impl Iterator<Item = &'static KeywordRule> {
    RULES.iter().filter(move |rule| rule.category == category)
}

/// Returns the first phrase found in `haystack` at a word boundary.
pub(crate) fn find_phrase<'a>(haystack: &str, phrases: &[&'a str]) -> Option<&'a str> {
    phrases
        .iter()
        .copied()
        .find(|phrase| contains_phrase(haystack, phrase))
}

/// Word-boundary aware containment test (see module docs).
pub(crate) fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    matches_bounded(haystack, phrase, phrase.chars().count() <= 3)
}

/// Whole-word match regardless of length. Used for the clause modifiers,
/// where "need" must not fire inside "needles".
pub(crate) fn contains_word(haystack: &str, phrase: &str) -> bool {
    matches_bounded(haystack, phrase, true)
}

fn matches_bounded(haystack: &str, phrase: &str, whole_word: bool) -> bool {
    haystack.match_indices(phrase).any(|(start, matched)| {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = !whole_word
            || haystack[start + matched.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_rules() {
        for category in Category::all() {
            assert!(rules_for(*category).count() > 0, "no rules for {:?}", category);
        }
    }

    #[test]
    fn long_phrases_match_word_prefixes() {
        assert!(contains_phrase("i love swimming", "swim"));
        assert!(contains_phrase("traveling a lot", "travel"));
        assert!(!contains_phrase("i am inactive", "active"));
    }

    #[test]
    fn short_phrases_match_whole_words_only() {
        assert!(contains_phrase("use the app daily", "app"));
        assert!(!contains_phrase("my appointment", "app"));
        assert!(contains_phrase("i run", "run"));
        assert!(!contains_phrase("a rung", "run"));
    }

    #[test]
    fn modifiers_match_whole_words_only() {
        assert!(!contains_word("i hate needles", "need"));
        assert!(!contains_word("mustard on everything", "must"));
        assert!(!contains_word("it's topical", "top"));
        assert!(contains_word("i need it", "need"));
        assert!(contains_word("i don't care, honestly", "don't care"));
        assert!(INTENSIFIERS.iter().all(|p| !contains_word("needles and mustard", p)));
    }

    #[test]
    fn find_phrase_returns_first_matching_phrase() {
        let found = find_phrase("something waterproof please", &["waterproof", "water"]);
        assert_eq!(found, Some("waterproof"));
    }
}
