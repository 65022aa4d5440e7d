//! Lightweight HTML text and metadata extraction.
//!
//! Regex-based rather than a full parser: good enough to give the model a
//! readable view of a page, not a faithful DOM.

use regex::Regex;
use serde::Serialize;

/// A hyperlink found on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// Readable content pulled out of an HTML document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub title: Option<String>,
    pub description: String,
    /// Visible text with whitespace collapsed.
    pub text: String,
    /// Absolute http(s) links in document order.
    pub links: Vec<Link>,
}

/// Extracts titles, meta descriptions, links and visible text from HTML.
pub struct HtmlExtractor {
    hidden_blocks: Regex,
    title: Regex,
    meta_tag: Regex,
    attribute: Regex,
    anchor: Regex,
    tag: Regex,
    whitespace: Regex,
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self {
            hidden_blocks: Regex::new(
                r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->",
            )
            .expect("Invalid regex"),
            title: Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("Invalid regex"),
            meta_tag: Regex::new(r"(?is)<meta\b[^>]*>").expect("Invalid regex"),
            attribute: Regex::new(
                r#"(?is)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
            )
            .expect("Invalid regex"),
            anchor: Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("Invalid regex"),
            tag: Regex::new(r"(?s)<[^>]*>").expect("Invalid regex"),
            whitespace: Regex::new(r"\s+").expect("Invalid regex"),
        }
    }

    /// Extract a page summary, keeping at most `max_links` links.
    pub fn extract(&self, html: &str, max_links: usize) -> PageSummary {
        let visible = self.hidden_blocks.replace_all(html, " ");

        let title = self
            .title
            .captures(&visible)
            .and_then(|caps| caps.get(1))
            .map(|m| self.clean_text(m.as_str()))
            .filter(|t| !t.is_empty());

        let description = self
            .meta_tag
            .find_iter(&visible)
            .find_map(|tag| {
                let attrs = self.attributes(tag.as_str());
                let is_description = attrs
                    .iter()
                    .any(|(k, v)| k == "name" && v.eq_ignore_ascii_case("description"));
                if is_description {
                    attrs
                        .into_iter()
                        .find(|(k, _)| k == "content")
                        .map(|(_, v)| decode_entities(&v))
                } else {
                    None
                }
            })
            .unwrap_or_default();

        let links = self
            .anchor
            .captures_iter(&visible)
            .filter_map(|caps| {
                let attrs = self.attributes(caps.get(1)?.as_str());
                let href = attrs.into_iter().find(|(k, _)| k == "href")?.1;
                if !href.starts_with("http") {
                    return None;
                }
                Some(Link {
                    url: decode_entities(&href),
                    text: self.clean_text(caps.get(2).map(|m| m.as_str()).unwrap_or_default()),
                })
            })
            .take(max_links)
            .collect();

        PageSummary {
            title,
            description,
            text: self.clean_text(&visible),
            links,
        }
    }

    /// Strip tags, decode entities, and collapse whitespace.
    fn clean_text(&self, fragment: &str) -> String {
        let without_tags = self.tag.replace_all(fragment, " ");
        let decoded = decode_entities(&without_tags);
        self.whitespace.replace_all(&decoded, " ").trim().to_string()
    }

    fn attributes(&self, tag: &str) -> Vec<(String, String)> {
        self.attribute
            .captures_iter(tag)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().to_lowercase();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))?
                    .as_str()
                    .to_string();
                Some((name, value))
            })
            .collect()
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the handful of entities common in page text.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Truncate to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
