//! Template narrative used whenever the completion service is unavailable.

use crate::domain::catalog::DeviceProfile;
use crate::domain::scoring::NarrativeSource;

use super::{Narrative, RankedDevice};

/// Builds the deterministic narrative from catalog data alone.
///
/// The same inputs always produce byte-identical text.
pub fn fallback_narrative(
    winner: &RankedDevice,
    winner_profile: &DeviceProfile,
    runner_up: Option<&RankedDevice>,
) -> Narrative {
    let mut text = format!(
        "{} by {} is the closest match to the priorities you described, \
         with an overall match score of {:.1} out of 100.",
        winner_profile.label, winner_profile.brand, winner.aggregate_score
    );

    if let Some(ideal_for) = &winner_profile.ideal_for {
        text.push_str(&format!(" It is a good fit for {}.", trim_period(ideal_for)));
    }

    if !winner_profile.pros.is_empty() {
        text.push_str(&format!(
            " Highlights include {}.",
            join_list(&winner_profile.pros)
        ));
    }

    if let Some(runner_up) = runner_up {
        text.push_str(&format!(
            " {} is a close alternative (score {:.1}) worth discussing with your care team.",
            runner_up.label, runner_up.aggregate_score
        ));
    }

    Narrative {
        text,
        strengths: winner_profile.pros.clone(),
        considerations: winner_profile.cons.clone(),
        source: NarrativeSource::Fallback,
    }
}

fn trim_period(text: &str) -> &str {
    text.trim().trim_end_matches('.')
}

fn join_list(items: &[String]) -> String {
    let items: Vec<String> = items
        .iter()
        .map(|s| trim_period(s).to_lowercase())
        .collect();
    match items.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
