//! Plain-text report rendering.
//!
//! Sections always appear in the same order and the report never contains
//! timestamps, so regenerating it from the same session and narrative gives
//! the same bytes.

use std::fmt::Write;

use crate::domain::catalog::DeviceProfile;
use crate::domain::foundation::Category;
use crate::domain::session::SessionState;

use super::{AggregateRanking, Narrative, RankedDevice};

/// Everything the report needs, borrowed.
pub(crate) struct ReportInput<'a> {
    pub catalog_version: &'a str,
    pub winner: &'a RankedDevice,
    pub winner_profile: &'a DeviceProfile,
    pub runner_up: Option<&'a RankedDevice>,
    pub session: &'a SessionState,
    pub ranking: &'a AggregateRanking,
    pub narrative: &'a Narrative,
    pub reasons: &'a [String],
    pub considerations: &'a [String],
}

const NEXT_STEPS: &[&str] = &[
    "Share this report with your endocrinologist or diabetes care team.",
    "Confirm coverage for the recommended device with your insurance plan.",
    "Ask the manufacturer about a demo or trial before you commit.",
    "Revisit any category you skipped; it may change the recommendation.",
];

pub(crate) fn render_report(input: &ReportInput<'_>) -> String {
    let mut out = String::new();

    // Header
    heading(&mut out, "PUMPDRIVE INSULIN PUMP RECOMMENDATION", '=');
    line(&mut out, &format!("Catalog version: {}", input.catalog_version));
    line(
        &mut out,
        &format!(
            "Categories answered: {} of {}",
            input.ranking.answered_categories.len(),
            Category::all().len()
        ),
    );
    if input.ranking.is_partial() {
        line(
            &mut out,
            "Note: this is a partial assessment. Results may change once all categories are answered.",
        );
    }
    out.push('\n');

    // Recommended device + score
    heading(&mut out, "RECOMMENDED DEVICE", '-');
    line(&mut out, &input.winner_profile.display_name());
    line(
        &mut out,
        &format!("Overall match score: {:.1} / 100", input.winner.aggregate_score),
    );
    if let Some(runner_up) = input.runner_up {
        line(
            &mut out,
            &format!(
                "Runner-up: {} ({}) - {:.1} / 100",
                runner_up.label, runner_up.brand, runner_up.aggregate_score
            ),
        );
    }
    out.push('\n');

    // Technical attributes
    heading(&mut out, "TECHNICAL ATTRIBUTES", '-');
    if input.winner_profile.attributes.is_empty() {
        line(&mut out, "No technical attributes listed.");
    }
    for attribute in &input.winner_profile.attributes {
        line(&mut out, &format!("- {}: {}", attribute.name, attribute.value));
    }
    out.push('\n');

    // Patient priorities
    heading(&mut out, "YOUR PRIORITIES", '-');
    for category in Category::all() {
        match input.session.score(*category) {
            Some(score) => {
                let top = score
                    .winner()
                    .map(|d| format!("{} ({:.1})", d.label, d.score))
                    .unwrap_or_else(|| "none".to_string());
                line(&mut out, &format!("{}: best match {}", category.title(), top));
                if score.facts.is_empty() {
                    line(&mut out, "  - No specific preference expressed");
                }
                for fact in &score.facts {
                    line(&mut out, &format!("  - {} ({})", fact.label, fact.weight));
                }
            }
            None => line(&mut out, &format!("{}: NOT ANSWERED", category.title())),
        }
    }
    out.push('\n');

    // Reasons
    heading(&mut out, "WHY THIS DEVICE", '-');
    line(&mut out, &input.narrative.text);
    for reason in input.reasons {
        line(&mut out, &format!("- {}", reason));
    }
    out.push('\n');

    // Considerations
    heading(&mut out, "CONSIDERATIONS", '-');
    if input.considerations.is_empty() {
        line(&mut out, "No specific considerations noted.");
    }
    for consideration in input.considerations {
        line(&mut out, &format!("- {}", consideration));
    }
    out.push('\n');

    // Next steps
    heading(&mut out, "NEXT STEPS", '-');
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        line(&mut out, &format!("{}. {}", i + 1, step));
    }

    out
}

fn heading(out: &mut String, title: &str, underline: char) {
    line(out, title);
    line(out, &underline.to_string().repeat(title.chars().count()));
}

fn line(out: &mut String, text: &str) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", text);
}

#[cfg(test)]
mod tests {
    use crate::domain::catalog::Catalog;
    use crate::domain::foundation::Category;
    use crate::domain::preference::PreferenceExtractor;
    use crate::domain::recommendation::{
        fallback_narrative, FinalRecommendation, RankedDevice, RecommendationAggregator,
    };
    use crate::domain::scoring::{CategoryScore, DeterministicScorer};
    use crate::domain::session::SessionState;

    fn recommend(session: &SessionState, catalog: &Catalog) -> FinalRecommendation {
        let ranking = RecommendationAggregator::aggregate(session, catalog).unwrap();
        let winner = ranking.winner().unwrap();
        let profile = catalog.get_by_id(&winner.device_id).unwrap();
        let ranked = RankedDevice {
            device_id: winner.device_id.clone(),
            label: winner.label.clone(),
            brand: profile.brand.clone(),
            aggregate_score: winner.aggregate_score,
            rank: 1,
            categories: winner.categories.clone(),
        };
        let narrative = fallback_narrative(&ranked, profile, None);
        FinalRecommendation::assemble(&ranking, session, catalog, narrative).unwrap()
    }

    fn answered(catalog: &Catalog, answers: &[(Category, &str)]) -> SessionState {
        let extractor = PreferenceExtractor::new(catalog.schema().clone());
        let mut session = SessionState::new();
        for (category, text) in answers {
            let prefs = extractor.extract(*category, text, &[]);
            let ranking = DeterministicScorer::score(*category, &prefs.weights, catalog);
            let score = CategoryScore::from_ranking(&ranking, *text, vec![], prefs.facts);
            session.record_score(score, prefs.weights).unwrap();
        }
        session
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let catalog = Catalog::builtin().unwrap();
        let session = answered(
            &catalog,
            &[
                (Category::Cost, "My insurance coverage is essential."),
                (Category::Lifestyle, "I travel constantly and need something waterproof"),
            ],
        );

        let report = recommend(&session, &catalog).report;
        let order = [
            "PUMPDRIVE INSULIN PUMP RECOMMENDATION",
            "RECOMMENDED DEVICE",
            "TECHNICAL ATTRIBUTES",
            "YOUR PRIORITIES",
            "WHY THIS DEVICE",
            "CONSIDERATIONS",
            "NEXT STEPS",
        ];
        let positions: Vec<usize> = order.iter().map(|h| report.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn missing_categories_are_marked() {
        let catalog = Catalog::builtin().unwrap();
        let session = answered(&catalog, &[(Category::Algorithm, "I want it fully automated")]);

        let recommendation = recommend(&session, &catalog);
        assert!(recommendation.is_partial());
        assert!(recommendation.report.contains("partial assessment"));
        assert!(recommendation.report.contains("Cost & Insurance: NOT ANSWERED"));
        assert!(recommendation.report.contains("Categories answered: 1 of 6"));
    }

    #[test]
    fn regenerating_gives_identical_bytes() {
        let catalog = Catalog::builtin().unwrap();
        let session = answered(
            &catalog,
            &[
                (Category::Complexity, "I hate alarms and want to bolus from my phone"),
                (Category::Support, "My clinic knows the devices well"),
            ],
        );

        let first = recommend(&session, &catalog);
        let second = recommend(&session, &catalog);
        assert_eq!(first.report, second.report);
    }
}
