//! Prompt construction for category and final enrichment calls.
//!
//! Contexts serialize deterministically (ordered maps, fixed field order),
//! so the same inputs always yield the same cache key.

use serde::Serialize;

use crate::domain::catalog::{Catalog, CatalogExcerpt};
use crate::domain::foundation::{Category, SessionId};
use crate::domain::recommendation::AggregateRanking;
use crate::domain::scoring::CategoryScore;
use crate::domain::session::SessionState;
use crate::ports::{CacheKey, CompletionRequest, MessageRole, RequestMetadata};

/// Cache scope of the final narrative.
pub const FINAL_SCOPE: &str = "final";

const RESPONSE_FORMAT: &str = "Respond with JSON only, no prose around it: \
{\"summary\": string, \"strengths\": [string], \"considerations\": [string], \
\"recommended_device_ids\": [string]}. Only use device ids from the catalog excerpt.";

const CATEGORY_SYSTEM_PROMPT: &str = "You are a certified diabetes educator helping a patient \
compare insulin pumps. You explain a ranking that has already been computed; you do not \
change it. Be concise, factual and supportive. Never give dosing advice.";

const FINAL_SYSTEM_PROMPT: &str = "You are a certified diabetes educator writing the summary \
of an insulin pump assessment for a patient and their care team. Explain why the top-ranked \
device fits the priorities the patient actually expressed. The ranking is final. Never give \
dosing advice.";

/// Everything the category call needs.
#[derive(Debug, Clone)]
pub struct CategoryContext {
    pub session_id: SessionId,
    pub score: CategoryScore,
    pub excerpt: CatalogExcerpt,
}

impl CategoryContext {
    pub fn new(session_id: SessionId, score: CategoryScore, catalog: &Catalog) -> Self {
        let excerpt = catalog.excerpt(score.category);
        Self {
            session_id,
            score,
            excerpt,
        }
    }

    pub fn category(&self) -> Category {
        self.score.category
    }

    /// Keyed on the category and the patient's own words.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_enrichment(self.score.category.id(), &self.score.transcript)
    }

    pub fn to_request(&self, trace_id: &str, max_tokens: u32) -> CompletionRequest {
        let facts: Vec<String> = self
            .score
            .facts
            .iter()
            .map(|f| format!("- {} ({:.1}): \"{}\"", f.label, f.weight.value(), f.evidence))
            .collect();
        let top: Vec<String> = self
            .score
            .top_devices
            .iter()
            .map(|d| format!("{}. {} [{}] score {:.1}", d.rank, d.label, d.device_id, d.score))
            .collect();
        let excerpt = serde_json::to_string(&self.excerpt).unwrap_or_default();

        let prompt = format!(
            "Category: {title}\n\nPatient said:\n{transcript}\n\nTopics: {topics}\n\n\
             Extracted preferences:\n{facts}\n\nComputed ranking:\n{top}\n\n\
             Catalog excerpt:\n{excerpt}\n\n{format}",
            title = self.score.title,
            transcript = self.score.transcript,
            topics = if self.score.topics.is_empty() {
                "none".to_string()
            } else {
                self.score.topics.join(", ")
            },
            facts = if facts.is_empty() {
                "none".to_string()
            } else {
                facts.join("\n")
            },
            top = top.join("\n"),
            excerpt = excerpt,
            format = RESPONSE_FORMAT,
        );

        CompletionRequest::new(RequestMetadata::new(
            self.session_id,
            Some(self.score.category),
            trace_id,
        ))
        .with_system_prompt(CATEGORY_SYSTEM_PROMPT)
        .with_message(MessageRole::User, prompt)
        .with_max_tokens(max_tokens)
        .with_temperature(0.0)
    }
}

/// Canonical, serializable summary of an assessment for the final call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalContext {
    #[serde(skip)]
    pub session_id: SessionId,
    pub rankings: Vec<RankedSummary>,
    pub answered: Vec<CategorySummary>,
    pub missing_categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSummary {
    pub rank: usize,
    pub device_id: String,
    pub label: String,
    pub aggregate_score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub winner: Option<String>,
    pub facts: Vec<String>,
}

impl FinalContext {
    pub fn new(session: &SessionState, ranking: &AggregateRanking) -> Self {
        let rankings = ranking
            .entries
            .iter()
            .map(|e| RankedSummary {
                rank: e.rank,
                device_id: e.device_id.clone(),
                label: e.label.clone(),
                // Fixed precision keeps the serialized form stable.
                aggregate_score: format!("{:.1}", e.aggregate_score),
            })
            .collect();

        let answered = session
            .scored()
            .into_iter()
            .map(|score| CategorySummary {
                category: score.category,
                winner: score.winner().map(|d| d.device_id.clone()),
                facts: score
                    .facts
                    .iter()
                    .map(|f| format!("{}: {}", f.label, f.evidence))
                    .collect(),
            })
            .collect();

        Self {
            session_id: session.id(),
            rankings,
            answered,
            missing_categories: ranking.missing_categories.clone(),
        }
    }

    /// Compact JSON of the context, in declaration order.
    pub fn canonical(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn cache_key(&self) -> CacheKey {
        // Facts from every answer must reach the key, not just the rankings.
        CacheKey::for_full_text(FINAL_SCOPE, &self.canonical())
    }

    pub fn to_request(&self, trace_id: &str, max_tokens: u32, catalog: &Catalog) -> CompletionRequest {
        let mut devices = Vec::new();
        for summary in self.rankings.iter().take(2) {
            if let Ok(profile) = catalog.get_by_id(&summary.device_id) {
                devices.push(format!(
                    "{} by {}: pros {:?}; cons {:?}; ideal for {}",
                    profile.label,
                    profile.brand,
                    profile.pros,
                    profile.cons,
                    profile.ideal_for.as_deref().unwrap_or("n/a")
                ));
            }
        }

        let prompt = format!(
            "Assessment summary (JSON):\n{context}\n\nTop devices:\n{devices}\n\n\
             Write the summary for the rank-1 device, mention the runner-up briefly, \
             and note any categories the patient did not answer.\n\n{format}",
            context = self.canonical(),
            devices = devices.join("\n"),
            format = RESPONSE_FORMAT,
        );

        CompletionRequest::new(RequestMetadata::new(self.session_id, None, trace_id))
            .with_system_prompt(FINAL_SYSTEM_PROMPT)
            .with_message(MessageRole::User, prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preference::PreferenceExtractor;
    use crate::domain::recommendation::RecommendationAggregator;
    use crate::domain::scoring::DeterministicScorer;

    fn scored_session(catalog: &Catalog) -> (SessionState, CategoryScore) {
        let extractor = PreferenceExtractor::new(catalog.schema().clone());
        let transcript = "I travel constantly and need something waterproof";
        let extracted = extractor.extract(Category::Lifestyle, transcript, &[]);
        let ranking = DeterministicScorer::score(Category::Lifestyle, &extracted.weights, catalog);
        let score = CategoryScore::from_ranking(&ranking, transcript, vec![], extracted.facts);

        let mut session = SessionState::new();
        session.record_score(score.clone(), extracted.weights).unwrap();
        (session, score)
    }

    #[test]
    fn category_request_carries_transcript_and_metadata() {
        let catalog = Catalog::builtin().unwrap();
        let (session, score) = scored_session(&catalog);
        let ctx = CategoryContext::new(session.id(), score, &catalog);

        let request = ctx.to_request("trace-1", 512);

        assert_eq!(request.metadata.category, Some(Category::Lifestyle));
        assert_eq!(request.max_tokens, Some(512));
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.messages[0].content.contains("waterproof"));
        assert!(request.messages[0].content.contains("omnipod-5"));
    }

    #[test]
    fn category_cache_key_depends_on_transcript_only() {
        let catalog = Catalog::builtin().unwrap();
        let (session, score) = scored_session(&catalog);
        let a = CategoryContext::new(session.id(), score.clone(), &catalog);
        let b = CategoryContext::new(SessionId::new(), score, &catalog);

        assert_eq!(a.cache_key(), b.cache_key());
        assert!(a.cache_key().as_str().starts_with("enrich:lifestyle:"));
    }

    #[test]
    fn final_context_is_canonical() {
        let catalog = Catalog::builtin().unwrap();
        let (session, _) = scored_session(&catalog);
        let ranking = RecommendationAggregator::aggregate(&session, &catalog).unwrap();

        let a = FinalContext::new(&session, &ranking);
        let b = FinalContext::new(&session, &ranking);

        assert_eq!(a.canonical(), b.canonical());
        assert!(a.canonical().starts_with("{\"rankings\""));
        assert!(a.cache_key().as_str().starts_with("enrich:final:"));
        assert_eq!(a.missing_categories.len(), 5);
    }

    #[test]
    fn final_request_has_no_category() {
        let catalog = Catalog::builtin().unwrap();
        let (session, _) = scored_session(&catalog);
        let ranking = RecommendationAggregator::aggregate(&session, &catalog).unwrap();

        let request = FinalContext::new(&session, &ranking).to_request("t", 1024, &catalog);

        assert_eq!(request.metadata.category, None);
        assert_eq!(request.system_prompt.as_deref(), Some(FINAL_SYSTEM_PROMPT));
    }

    #[test]
    fn final_key_differs_when_only_facts_differ() {
        let catalog = Catalog::builtin().unwrap();
        let (session, _) = scored_session(&catalog);
        let ranking = RecommendationAggregator::aggregate(&session, &catalog).unwrap();

        let a = FinalContext::new(&session, &ranking);
        let mut b = a.clone();
        b.answered[0].facts.push("Travel: I fly every week".to_string());

        assert_eq!(a.rankings, b.rankings);
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn final_key_differs_when_only_missing_categories_differ() {
        let catalog = Catalog::builtin().unwrap();
        let (session, _) = scored_session(&catalog);
        let ranking = RecommendationAggregator::aggregate(&session, &catalog).unwrap();

        let a = FinalContext::new(&session, &ranking);
        let mut b = a.clone();
        b.missing_categories.pop();

        assert_ne!(a.cache_key(), b.cache_key());
    }
}
