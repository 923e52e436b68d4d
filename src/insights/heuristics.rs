//! Deterministic, provider-free document analysis.
//!
//! These routines back the heuristic insight tier and also serve as the
//! per-field fallback when an individual analysis prompt fails. People and
//! location extraction are intentionally not implemented and always return
//! empty lists.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::EntitySet;

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").expect("date regex"),
        Regex::new(r"\b\d{1,2}-\d{1,2}-\d{2,4}\b").expect("date regex"),
        Regex::new(
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}\b",
        )
        .expect("date regex"),
    ]
});

static ACTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:should|must|recommend(?:ed|s)?|required?|need(?:s)? to|next steps?|action items?)\b")
        .expect("action regex")
});

const ORG_KEYWORDS: [&str; 8] = [
    "Inc",
    "Corp",
    "Ltd",
    "LLC",
    "Company",
    "University",
    "Institute",
    "Center",
];

/// Placeholder topics used when no capitalized phrases are found.
pub const FALLBACK_TOPICS: [&str; 2] = ["Document Analysis", "General Content"];

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => text[..offset].to_string(),
        None => text.to_string(),
    }
}

/// Extractive summary: the first three sentences longer than 20 characters,
/// joined and truncated to 500 characters.
pub fn smart_summary(text: &str) -> String {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > 20)
        .take(3)
        .collect();

    if sentences.is_empty() {
        let fallback = truncate_chars(text.trim(), 500);
        if fallback.is_empty() {
            return "Document processed successfully.".to_string();
        }
        return fallback;
    }

    truncate_chars(&format!("{}.", sentences.join(". ")), 500)
}

/// Most frequent capitalized multi-word phrases, top 5.
///
/// Falls back to a fixed placeholder pair when the text contains none.
pub fn key_topics(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;

    let mut run: Vec<String> = Vec::new();
    for token in text.split_whitespace().chain(std::iter::once("")) {
        let word: String = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());

        if capitalized {
            run.push(word);
            continue;
        }

        if run.len() >= 2 {
            let phrase = run.join(" ");
            if phrase.chars().count() > 3 {
                let entry = counts.entry(phrase).or_insert_with(|| {
                    order += 1;
                    (0, order)
                });
                entry.0 += 1;
            }
        }
        run.clear();
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(phrase, (count, seen))| (phrase, count, seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let topics: Vec<String> = ranked.into_iter().take(5).map(|(p, _, _)| p).collect();
    if topics.is_empty() {
        FALLBACK_TOPICS.iter().map(|t| t.to_string()).collect()
    } else {
        topics
    }
}

/// Pattern-based entity extraction: dates and organizations only.
pub fn heuristic_entities(text: &str) -> EntitySet {
    EntitySet {
        people: Vec::new(),
        organizations: extract_organizations(text),
        dates: extract_dates(text),
        locations: Vec::new(),
    }
}

/// Dates matching `MM/DD/YYYY`, `MM-DD-YYYY`, or `Month DD, YYYY`,
/// deduplicated in first-seen order and capped at 3.
pub fn extract_dates(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in DATE_PATTERNS.iter() {
        for hit in pattern.find_iter(text) {
            let value = hit.as_str().to_string();
            if !found.contains(&value) {
                found.push(value);
            }
        }
    }
    found.truncate(3);
    found
}

/// Organization snippets from the first 10 sentences, capped at 3.
///
/// A snippet is up to two words preceding an organization keyword plus the
/// keyword word itself.
pub fn extract_organizations(text: &str) -> Vec<String> {
    let mut orgs: Vec<String> = Vec::new();

    for sentence in text.split('.').take(10) {
        for keyword in ORG_KEYWORDS {
            if !sentence.contains(keyword) {
                continue;
            }
            let words: Vec<&str> = sentence.split_whitespace().collect();
            let Some(idx) = words.iter().position(|word| word.contains(keyword)) else {
                continue;
            };
            let snippet = words[idx.saturating_sub(2)..=idx].join(" ");
            let snippet = snippet.trim().to_string();
            if snippet.chars().count() > 3 && !orgs.contains(&snippet) {
                orgs.push(snippet);
            }
        }
    }

    orgs.truncate(3);
    orgs
}

/// Sentences phrased as recommendations or next steps, capped at 5 items of
/// at most 100 characters each.
pub fn action_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    for sentence in text.split(['.', '!', '?', '\n']) {
        let sentence = sentence.trim();
        if sentence.is_empty() || !ACTION_PATTERN.is_match(sentence) {
            continue;
        }
        items.push(truncate_chars(sentence, 100));
        if items.len() == 5 {
            break;
        }
    }
    items
}

/// Reading time at 200 words per minute.
pub fn estimate_reading_time(text: &str) -> String {
    let words = text.split_whitespace().count();
    if words == 0 {
        return "< 1 minute".to_string();
    }
    let minutes = words as f64 / 200.0;
    if minutes < 1.0 {
        return "< 1 minute".to_string();
    }
    if minutes < 60.0 {
        return format!("{} minutes", minutes as u64);
    }
    let total = minutes as u64;
    format!("{}h {}m", total / 60, total % 60)
}

/// Complexity bucket from the average word length.
pub fn calculate_complexity(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return "Unknown".to_string();
    }
    let total_len: usize = words.iter().map(|word| word.chars().count()).sum();
    let avg_len = total_len as f64 / words.len() as f64;
    if avg_len > 6.0 {
        "High".to_string()
    } else if avg_len > 4.5 {
        "Medium".to_string()
    } else {
        "Low".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_buckets() {
        let four_hundred = "word ".repeat(400);
        assert_eq!(estimate_reading_time(&four_hundred), "2 minutes");
        assert_eq!(estimate_reading_time(""), "< 1 minute");
        assert_eq!(estimate_reading_time("just a few words"), "< 1 minute");
        let thirteen_thousand = "word ".repeat(13_000);
        assert_eq!(estimate_reading_time(&thirteen_thousand), "1h 5m");
    }

    #[test]
    fn complexity_buckets() {
        assert_eq!(calculate_complexity(""), "Unknown");
        assert_eq!(calculate_complexity("implant ossature chimney"), "High");
        assert_eq!(calculate_complexity("quick brown foxes"), "Medium");
        assert_eq!(calculate_complexity("a la car"), "Low");
    }

    #[test]
    fn summary_takes_first_three_long_sentences() {
        let text = "Short. This opening sentence is easily long enough. Tiny! \
                    Here is another sentence with plenty of characters. \
                    A third long sentence rounds out the summary nicely. \
                    This fourth long sentence must not appear in the output.";
        let summary = smart_summary(text);
        assert!(summary.starts_with("This opening sentence"));
        assert!(summary.contains("third long sentence"));
        assert!(!summary.contains("fourth long sentence"));
        assert!(summary.chars().count() <= 500);
    }

    #[test]
    fn summary_of_empty_text_is_placeholder() {
        assert_eq!(smart_summary("   "), "Document processed successfully.");
    }

    #[test]
    fn dates_are_deduplicated_and_capped() {
        let text = "Signed 01/02/2024, revised 01/02/2024 and 3-4-2023, \
                    effective March 5, 2024, expiring June 1, 2025.";
        let dates = extract_dates(text);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], "01/02/2024");
        assert_eq!(dates[1], "3-4-2023");
    }

    #[test]
    fn organizations_take_preceding_context() {
        let text = "The report was prepared by Acme Widgets Inc for review. \
                    Researchers at Stanford University contributed data.";
        let orgs = extract_organizations(text);
        assert!(orgs.contains(&"Acme Widgets Inc".to_string()));
        assert!(orgs.contains(&"at Stanford University".to_string()));
    }

    #[test]
    fn organizations_only_scan_first_ten_sentences() {
        let filler = "Nothing here. ".repeat(10);
        let text = format!("{filler}Mention of Globex Corp arrives too late.");
        assert!(extract_organizations(&text).is_empty());
    }

    #[test]
    fn topics_rank_frequent_capitalized_phrases() {
        let text = "Machine Learning is central. Machine Learning models improve. \
                    Data Privacy matters, and Machine Learning again.";
        let topics = key_topics(text);
        assert_eq!(topics[0], "Machine Learning");
        assert!(topics.contains(&"Data Privacy".to_string()));
    }

    #[test]
    fn topics_default_to_placeholder_pair() {
        let topics = key_topics("all lowercase words here with nothing capitalized");
        assert_eq!(
            topics,
            vec!["Document Analysis".to_string(), "General Content".to_string()]
        );
    }

    #[test]
    fn action_items_are_capped_and_truncated() {
        let text = "You should review the budget. The team must submit reports. \
                    We recommend quarterly audits. Staff need to update passwords. \
                    Next steps include training. You should also archive old data. \
                    Nothing actionable here.";
        let items = action_items(text);
        assert_eq!(items.len(), 5);
        assert!(items[0].contains("should review"));
        for item in &items {
            assert!(item.chars().count() <= 100);
        }
    }

    #[test]
    fn people_and_locations_are_always_empty() {
        let entities = heuristic_entities("Alice met Bob in Paris on 01/02/2024.");
        assert!(entities.people.is_empty());
        assert!(entities.locations.is_empty());
        assert_eq!(entities.dates, vec!["01/02/2024"]);
    }
}
