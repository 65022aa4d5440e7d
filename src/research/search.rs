//! DuckDuckGo Instant Answer API response mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DUCKDUCKGO_API: &str = "https://api.duckduckgo.com/";

/// The subset of the Instant Answer response used for search results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    pub heading: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    pub abstract_url: String,
    #[serde(rename = "AbstractSource", default)]
    pub abstract_source: String,
    /// Either plain topics (with `Text`) or topic groups (with `Topics`).
    #[serde(rename = "RelatedTopics", default)]
    pub related_topics: Vec<Value>,
}

/// One search result as reported to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchResult {
    InstantAnswer {
        title: String,
        content: String,
        url: String,
        source: String,
    },
    RelatedTopic {
        title: String,
        content: String,
        url: String,
    },
}

impl InstantAnswer {
    /// Flatten into results: the abstract first (if any), then related
    /// topics drawn from the first `num_results` entries.
    pub fn into_results(self, num_results: usize) -> Vec<SearchResult> {
        let mut results = Vec::new();

        if !self.abstract_text.is_empty() {
            results.push(SearchResult::InstantAnswer {
                title: self.heading,
                content: self.abstract_text,
                url: self.abstract_url,
                source: self.abstract_source,
            });
        }

        for topic in self.related_topics.iter().take(num_results) {
            let Some(text) = topic.get("Text").and_then(Value::as_str) else {
                continue;
            };
            let url = topic
                .get("FirstURL")
                .and_then(Value::as_str)
                .unwrap_or_default();
            results.push(SearchResult::RelatedTopic {
                title: text.split(" - ").next().unwrap_or(text).to_string(),
                content: text.to_string(),
                url: url.to_string(),
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> InstantAnswer {
        serde_json::from_value(json!({
            "Heading": "Rust (programming language)",
            "Abstract": "Rust is a general-purpose programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "AbstractSource": "Wikipedia",
            "RelatedTopics": [
                {"Text": "Cargo - The Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
                {"Name": "See also", "Topics": [{"Text": "nested"}]},
                {"Text": "Crates.io - Package registry", "FirstURL": "https://duckduckgo.com/Crates.io"},
                {"Text": "Rustup", "FirstURL": "https://duckduckgo.com/Rustup"}
            ],
            "Answer": "",
            "Type": "A"
        }))
        .unwrap()
    }

    #[test]
    fn test_abstract_comes_first() {
        let results = sample().into_results(5);
        assert_eq!(results.len(), 4);
        match &results[0] {
            SearchResult::InstantAnswer { title, source, .. } => {
                assert_eq!(title, "Rust (programming language)");
                assert_eq!(source, "Wikipedia");
            }
            other => panic!("Expected instant answer, got {:?}", other),
        }
    }

    #[test]
    fn test_topic_title_is_text_before_dash() {
        let results = sample().into_results(5);
        assert_eq!(
            results[1],
            SearchResult::RelatedTopic {
                title: "Cargo".to_string(),
                content: "Cargo - The Rust package manager".to_string(),
                url: "https://duckduckgo.com/Cargo".to_string(),
            }
        );
    }

    #[test]
    fn test_num_results_limits_topics_scanned() {
        // First two entries: one plain topic and one group without Text.
        let results = sample().into_results(2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_response() {
        let answer: InstantAnswer = serde_json::from_value(json!({})).unwrap();
        assert!(answer.into_results(5).is_empty());
    }

    #[test]
    fn test_result_serializes_with_type_tag() {
        let value = serde_json::to_value(&sample().into_results(1)[1]).unwrap();
        assert_eq!(value["type"], json!("related_topic"));
        assert_eq!(value["title"], json!("Cargo"));
    }
}
