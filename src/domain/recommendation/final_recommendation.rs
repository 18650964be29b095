//! FinalRecommendation - the derived, on-demand result of an assessment.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Catalog, CatalogError, DeviceProfile};
use crate::domain::foundation::{Category, Timestamp};
use crate::domain::scoring::NarrativeSource;
use crate::domain::session::SessionState;

use super::report::{render_report, ReportInput};
use super::{AggregateEntry, AggregateRanking};

/// A device in the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDevice {
    pub device_id: String,
    pub label: String,
    pub brand: String,
    pub aggregate_score: f64,
    pub rank: usize,
    pub categories: Vec<Category>,
}

impl RankedDevice {
    /// Builds a ranked device, filling the brand from the catalog.
    pub fn from_entry(entry: &AggregateEntry, catalog: &Catalog) -> Self {
        let brand = catalog
            .get_by_id(&entry.device_id)
            .map(|d| d.brand.clone())
            .unwrap_or_default();
        Self {
            device_id: entry.device_id.clone(),
            label: entry.label.clone(),
            brand,
            aggregate_score: entry.aggregate_score,
            rank: entry.rank,
            categories: entry.categories.clone(),
        }
    }
}

/// Qualitative explanation of the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub strengths: Vec<String>,
    pub considerations: Vec<String>,
    pub source: NarrativeSource,
}

/// The complete recommendation. Recomputed on demand, never stored as truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecommendation {
    pub winner: RankedDevice,
    pub runner_up: Option<RankedDevice>,
    pub rankings: Vec<RankedDevice>,
    pub narrative: Narrative,
    pub reasons: Vec<String>,
    pub considerations: Vec<String>,
    pub answered_categories: Vec<Category>,
    pub missing_categories: Vec<Category>,
    pub report: String,
    pub generated_at: Timestamp,
}

impl FinalRecommendation {
    /// Assembles the recommendation and renders its report.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` if the ranking is empty or its winner is
    ///   no longer in the catalog
    pub fn assemble(
        ranking: &AggregateRanking,
        session: &SessionState,
        catalog: &Catalog,
        narrative: Narrative,
    ) -> Result<Self, CatalogError> {
        let winner_entry = ranking
            .winner()
            .ok_or_else(|| CatalogError::NotFound("<no ranked device>".to_string()))?;
        let winner_profile = catalog.get_by_id(&winner_entry.device_id)?;

        let rankings: Vec<RankedDevice> = ranking
            .entries
            .iter()
            .map(|e| RankedDevice::from_entry(e, catalog))
            .collect();
        let winner = RankedDevice::from_entry(winner_entry, catalog);
        let runner_up = ranking
            .runner_up()
            .map(|e| RankedDevice::from_entry(e, catalog));

        let reasons = winner_reasons(session, &winner.device_id);
        let considerations = considerations_for(&narrative, winner_profile);

        let report = render_report(&ReportInput {
            catalog_version: catalog.version(),
            winner: &winner,
            winner_profile,
            runner_up: runner_up.as_ref(),
            session,
            ranking,
            narrative: &narrative,
            reasons: &reasons,
            considerations: &considerations,
        });

        Ok(Self {
            winner,
            runner_up,
            rankings,
            narrative,
            reasons,
            considerations,
            answered_categories: ranking.answered_categories.clone(),
            missing_categories: ranking.missing_categories.clone(),
            report,
            generated_at: Timestamp::now(),
        })
    }

    /// True if some categories were never answered.
    pub fn is_partial(&self) -> bool {
        !self.missing_categories.is_empty()
    }
}

/// Reasons cited for the winner across categories, deduplicated, in
/// canonical category order.
fn winner_reasons(session: &SessionState, device_id: &str) -> Vec<String> {
    let mut reasons = Vec::new();
    for score in session.scored() {
        if let Some(device) = score.device(device_id) {
            for reason in &device.reasons {
                let line = format!("{} - {}", score.title, reason.describe());
                if !reasons.contains(&line) {
                    reasons.push(line);
                }
            }
        }
    }
    reasons
}

fn considerations_for(narrative: &Narrative, winner: &DeviceProfile) -> Vec<String> {
    if narrative.considerations.is_empty() {
        winner.cons.clone()
    } else {
        narrative.considerations.clone()
    }
}
