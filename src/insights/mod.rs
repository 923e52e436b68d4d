//! One-shot document insight extraction.
//!
//! Analysis runs in tiers, each a complete fallback of the previous: an
//! LLM tier that issues five independent prompts (summary, topics,
//! entities, action items, sentiment), a deterministic heuristic tier used
//! when no completion provider is configured, and a minimal placeholder
//! tier as the ultimate safety net. A failed prompt degrades only its own
//! field; reading time and complexity are computed locally regardless of
//! which tier produced the rest.

pub mod heuristics;

use serde::{Deserialize, Serialize};

use crate::completion::CompletionClient;
use heuristics::truncate_chars;

/// Named entities extracted from a document.
///
/// People and locations are only populated by the LLM tier; the heuristic
/// path leaves them empty by design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySet {
    /// Person names.
    #[serde(default)]
    pub people: Vec<String>,
    /// Organization names or snippets.
    #[serde(default)]
    pub organizations: Vec<String>,
    /// Date strings as they appear in the text.
    #[serde(default)]
    pub dates: Vec<String>,
    /// Location names.
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Locally computed document statistics, attached regardless of tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Human-readable reading time estimate.
    pub estimated_reading_time: String,
    /// Complexity bucket: `High`, `Medium`, `Low`, or `Unknown`.
    pub complexity_score: String,
}

/// The analysis payload of an insight record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInsights {
    /// Concise document summary.
    pub summary: String,
    /// Up to five key topics.
    pub key_topics: Vec<String>,
    /// Extracted entities.
    pub entities: EntitySet,
    /// Up to five action items.
    pub action_items: Vec<String>,
    /// Overall sentiment: `Positive`, `Negative`, `Neutral`, or `Mixed`.
    pub sentiment: String,
    /// Locally computed statistics.
    pub document_stats: DocumentStats,
}

/// Persisted per-document insight record, overwritten wholesale on reprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    /// Opaque document identifier assigned at upload.
    pub doc_id: String,
    /// Number of chunks produced during ingestion.
    pub num_chunks: usize,
    /// Number of pages observed during extraction.
    pub page_count: usize,
    /// Whitespace-split word count of the extracted text.
    pub word_count: usize,
    /// The analysis payload.
    pub insights: DocumentInsights,
}

/// Analyze document text, selecting the richest tier available.
pub async fn analyze_document(
    text: &str,
    completion: Option<&dyn CompletionClient>,
    models: &[String],
) -> DocumentInsights {
    if text.trim().is_empty() {
        return minimal_insights(text);
    }

    match completion {
        Some(client) => llm_insights(client, models, text).await,
        None => heuristic_insights(text),
    }
}

/// Statistics computed locally, independent of any provider.
fn document_stats(text: &str) -> DocumentStats {
    DocumentStats {
        estimated_reading_time: heuristics::estimate_reading_time(text),
        complexity_score: heuristics::calculate_complexity(text),
    }
}

/// Heuristic tier: fully deterministic, no provider required.
fn heuristic_insights(text: &str) -> DocumentInsights {
    DocumentInsights {
        summary: heuristics::smart_summary(text),
        key_topics: heuristics::key_topics(text),
        entities: heuristics::heuristic_entities(text),
        action_items: heuristics::action_items(text),
        sentiment: "Neutral".to_string(),
        document_stats: document_stats(text),
    }
}

/// Minimal tier: fixed placeholders for content-free documents.
fn minimal_insights(text: &str) -> DocumentInsights {
    DocumentInsights {
        summary: "Document processed successfully.".to_string(),
        key_topics: vec!["Document Analysis".to_string()],
        entities: EntitySet::default(),
        action_items: Vec::new(),
        sentiment: "Neutral".to_string(),
        document_stats: document_stats(text),
    }
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Provide a concise 2-3 sentence summary of the following document:\n\n{}\n\nSummary:",
        truncate_chars(text, 2000)
    )
}

fn topics_prompt(text: &str) -> String {
    format!(
        "Extract the main topics and themes from this document. List 3-5 key topics:\n\n{}\n\nKey Topics (comma-separated):",
        truncate_chars(text, 3000)
    )
}

fn entities_prompt(text: &str) -> String {
    format!(
        "Extract important entities (people, organizations, dates, locations) from this document:\n\n{}\n\nFormat as JSON with keys: people, organizations, dates, locations\nIf a category has no items, use empty array.\n\nJSON:",
        truncate_chars(text, 3000)
    )
}

fn actions_prompt(text: &str) -> String {
    format!(
        "Extract any action items, recommendations, or next steps mentioned in this document:\n\n{}\n\nAction Items (one per line, or 'None found' if none):",
        truncate_chars(text, 3000)
    )
}

fn sentiment_prompt(text: &str) -> String {
    format!(
        "Analyze the overall sentiment and tone of this document:\n\n{}\n\nRespond with one word: Positive, Negative, Neutral, or Mixed",
        truncate_chars(text, 2000)
    )
}

/// LLM tier: pin the first responsive candidate model, then issue the
/// remaining prompts against it, degrading per field on failure.
async fn llm_insights(
    client: &dyn CompletionClient,
    models: &[String],
    text: &str,
) -> DocumentInsights {
    let probe = summary_prompt(text);
    let mut pinned: Option<(&str, String)> = None;
    for model in models {
        match client.complete(model, &probe).await {
            Ok(summary) => {
                pinned = Some((model.as_str(), summary));
                break;
            }
            Err(error) => {
                tracing::warn!(model = %model, error = %error, "Completion model unavailable; trying next candidate");
            }
        }
    }

    let Some((model, summary)) = pinned else {
        tracing::warn!("No completion model responded; using heuristic analysis");
        return heuristic_insights(text);
    };
    tracing::debug!(model, "Running analysis prompts");

    let key_topics = match client.complete(model, &topics_prompt(text)).await {
        Ok(raw) => parse_topics(&raw),
        Err(error) => {
            tracing::warn!(error = %error, "Topics prompt failed; using heuristic topics");
            heuristics::key_topics(text)
        }
    };

    let entities = match client.complete(model, &entities_prompt(text)).await {
        Ok(raw) => parse_entities(&raw).unwrap_or_else(|| heuristics::heuristic_entities(text)),
        Err(error) => {
            tracing::warn!(error = %error, "Entities prompt failed; using pattern extraction");
            heuristics::heuristic_entities(text)
        }
    };

    let action_items = match client.complete(model, &actions_prompt(text)).await {
        Ok(raw) => parse_action_items(&raw),
        Err(error) => {
            tracing::warn!(error = %error, "Action items prompt failed; using heuristic items");
            heuristics::action_items(text)
        }
    };

    let sentiment = match client.complete(model, &sentiment_prompt(text)).await {
        Ok(raw) => parse_sentiment(&raw),
        Err(error) => {
            tracing::warn!(error = %error, "Sentiment prompt failed; defaulting to Neutral");
            "Neutral".to_string()
        }
    };

    let summary = if summary.trim().is_empty() {
        heuristics::smart_summary(text)
    } else {
        summary.trim().to_string()
    };

    DocumentInsights {
        summary,
        key_topics,
        entities,
        action_items,
        sentiment,
        document_stats: document_stats(text),
    }
}

fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .take(5)
        .map(str::to_string)
        .collect()
}

fn parse_action_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).trim())
        .filter(|line| !line.is_empty() && !line.to_lowercase().starts_with("none"))
        .take(5)
        .map(str::to_string)
        .collect()
}

fn parse_sentiment(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| !c.is_alphabetic()).to_string())
        .filter(|word| !word.is_empty())
        .unwrap_or_else(|| "Neutral".to_string())
}

/// Parse the entities prompt's JSON reply, tolerating a markdown code fence.
/// Returns `None` when the payload is not valid JSON for an entity set.
fn parse_entities(raw: &str) -> Option<EntitySet> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();
    serde_json::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionClientError;
    use async_trait::async_trait;

    #[test]
    fn topics_parse_from_comma_list() {
        let topics = parse_topics("Budgets, Hiring , , Compliance");
        assert_eq!(topics, vec!["Budgets", "Hiring", "Compliance"]);
    }

    #[test]
    fn action_items_skip_none_found() {
        let items = parse_action_items("- Review the budget\nNone found\n- Schedule audit");
        assert_eq!(items, vec!["Review the budget", "Schedule audit"]);
    }

    #[test]
    fn sentiment_takes_first_word() {
        assert_eq!(parse_sentiment("Positive."), "Positive");
        assert_eq!(parse_sentiment("  Mixed — leaning negative"), "Mixed");
        assert_eq!(parse_sentiment(""), "Neutral");
    }

    #[test]
    fn entities_parse_plain_and_fenced_json() {
        let plain = r#"{"people":["Ada"],"organizations":[],"dates":[],"locations":["Paris"]}"#;
        let parsed = parse_entities(plain).expect("plain json");
        assert_eq!(parsed.people, vec!["Ada"]);
        assert_eq!(parsed.locations, vec!["Paris"]);

        let fenced = format!("```json\n{plain}\n```");
        assert!(parse_entities(&fenced).is_some());

        assert!(parse_entities("the model apologizes instead of JSON").is_none());
    }

    #[test]
    fn entities_tolerate_missing_keys() {
        let parsed = parse_entities(r#"{"people":["Ada"]}"#).expect("partial json");
        assert_eq!(parsed.people, vec!["Ada"]);
        assert!(parsed.dates.is_empty());
    }

    struct ScriptedClient {
        /// Prompt substring → canned reply; anything else fails.
        replies: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _model: &str,
            prompt: &str,
        ) -> Result<String, CompletionClientError> {
            for (needle, reply) in &self.replies {
                if prompt.contains(needle) {
                    return Ok((*reply).to_string());
                }
            }
            Err(CompletionClientError::GenerationFailed("scripted".into()))
        }
    }

    struct OfflineClient;

    #[async_trait]
    impl CompletionClient for OfflineClient {
        async fn complete(
            &self,
            _model: &str,
            _prompt: &str,
        ) -> Result<String, CompletionClientError> {
            Err(CompletionClientError::ProviderUnavailable("offline".into()))
        }
    }

    fn models() -> Vec<String> {
        vec!["primary".into(), "backup".into()]
    }

    #[tokio::test]
    async fn no_responsive_model_drops_to_heuristic_tier() {
        let text = "The team should review the budget before March 5, 2024. \
                    This document covers Quarterly Planning in detail here.";
        let insights = analyze_document(text, Some(&OfflineClient), &models()).await;
        // Heuristic fingerprints: Neutral sentiment and empty people list.
        assert_eq!(insights.sentiment, "Neutral");
        assert!(insights.entities.people.is_empty());
        assert_eq!(insights.entities.dates, vec!["March 5, 2024"]);
        assert!(!insights.action_items.is_empty());
    }

    #[tokio::test]
    async fn failed_prompt_degrades_only_its_field() {
        let client = ScriptedClient {
            replies: vec![
                ("Summary:", "A fine summary."),
                ("Key Topics", "Planning, Budgets"),
                ("JSON:", "not json at all"),
                // Action items prompt fails entirely.
                ("one word", "Positive"),
            ],
        };
        let text = "Staff must submit reports by 01/02/2024 to Acme Widgets Inc.";
        let insights = analyze_document(text, Some(&client), &models()).await;

        assert_eq!(insights.summary, "A fine summary.");
        assert_eq!(insights.key_topics, vec!["Planning", "Budgets"]);
        assert_eq!(insights.sentiment, "Positive");
        // Unparseable entity JSON falls back to pattern extraction.
        assert_eq!(insights.entities.dates, vec!["01/02/2024"]);
        // Failed action prompt falls back to the heuristic scan.
        assert_eq!(insights.action_items.len(), 1);
        assert!(insights.action_items[0].contains("must submit"));
    }

    #[tokio::test]
    async fn empty_text_uses_minimal_tier() {
        let insights = analyze_document("  \n ", None, &models()).await;
        assert_eq!(insights.summary, "Document processed successfully.");
        assert_eq!(insights.key_topics, vec!["Document Analysis"]);
        assert_eq!(insights.document_stats.complexity_score, "Unknown");
    }

    #[tokio::test]
    async fn stats_are_attached_on_every_tier() {
        let text = "word ".repeat(400);
        let offline = analyze_document(&text, None, &models()).await;
        assert_eq!(offline.document_stats.estimated_reading_time, "2 minutes");

        let llm = analyze_document(&text, Some(&OfflineClient), &models()).await;
        assert_eq!(llm.document_stats.estimated_reading_time, "2 minutes");
    }
}
