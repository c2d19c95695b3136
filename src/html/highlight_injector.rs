//! Highlight injection using lol_html for streaming HTML processing
//!
//! Wraps every occurrence of a rule's matched words in a coloured span.
//! Only text nodes are rewritten, so tags, attributes and entities in the
//! source document are never touched. Output is always computed from the
//! pristine document HTML; feeding highlighted HTML back in would nest spans.

use std::cell::RefCell;

use lol_html::html_content::ContentType;
use lol_html::{doc_text, element, rewrite_str, RewriteStrSettings};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::rules::HighlightRule;

/// Matched words per rule, positionally aligned with the rule list
pub type RuleMatches = Vec<Vec<String>>;

/// Configuration for highlight injection
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// CSS class put on every highlight span
    pub class_name: String,
    /// Data attribute carrying the rule index
    pub rule_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            class_name: "se-highlight".to_string(),
            rule_attribute: "data-rule".to_string(),
        }
    }
}

/// Result of highlight injection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightOutcome {
    /// The processed HTML with highlight spans
    #[serde(skip)]
    pub html: String,
    /// Number of spans injected
    pub applied: usize,
    /// Spans injected per rule, in rule order
    pub per_rule: Vec<usize>,
}

/// Errors during highlight injection
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("Matcher returned {matches} word lists for {rules} rules")]
    MisalignedMatches { rules: usize, matches: usize },

    #[error("Invalid word pattern: {0}")]
    InvalidPattern(String),

    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),
}

struct WordPattern {
    rule_index: usize,
    regex: Regex,
}

/// Apply per-rule matched words to the original document HTML
///
/// Matching is case-insensitive and literal. A word that starts or ends with
/// a word character only matches at a word boundary, so "art" does not light
/// up inside "start". Rules are applied in order and, within a rule, longer
/// words first; text already claimed by an earlier span is left alone.
pub fn apply_highlights(
    original_html: &str,
    rules: &[HighlightRule],
    matches: &[Vec<String>],
    config: &HighlightConfig,
) -> Result<HighlightOutcome, InjectError> {
    if matches.len() != rules.len() {
        return Err(InjectError::MisalignedMatches {
            rules: rules.len(),
            matches: matches.len(),
        });
    }

    let patterns = compile_patterns(matches)?;
    if patterns.is_empty() {
        return Ok(HighlightOutcome {
            html: original_html.to_string(),
            applied: 0,
            per_rule: vec![0; rules.len()],
        });
    }

    let per_rule = RefCell::new(vec![0usize; rules.len()]);
    // Text nodes may arrive split over several chunks
    let pending = RefCell::new(String::new());

    let html = rewrite_str(
        original_html,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                let mut buffer = pending.borrow_mut();
                buffer.push_str(chunk.as_str());

                if !chunk.last_in_text_node() {
                    chunk.remove();
                    return Ok(());
                }

                let text = std::mem::take(&mut *buffer);
                let marked = mark_text(&text, &patterns, rules, config, &mut per_rule.borrow_mut());
                chunk.replace(marked.as_deref().unwrap_or(text.as_str()), ContentType::Html);
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| InjectError::RewriteError(e.to_string()))?;

    let per_rule = per_rule.into_inner();
    let applied = per_rule.iter().sum();

    Ok(HighlightOutcome {
        html,
        applied,
        per_rule,
    })
}

fn compile_patterns(matches: &[Vec<String>]) -> Result<Vec<WordPattern>, InjectError> {
    let mut patterns = Vec::new();

    for (rule_index, words) in matches.iter().enumerate() {
        let mut seen: Vec<String> = Vec::new();
        let mut unique: Vec<&str> = Vec::new();
        for word in words {
            let word = word.trim();
            let key = word.to_lowercase();
            if word.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            unique.push(word);
        }
        unique.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        for word in unique {
            let regex = RegexBuilder::new(&word_pattern(word))
                .case_insensitive(true)
                .build()
                .map_err(|e| InjectError::InvalidPattern(e.to_string()))?;
            patterns.push(WordPattern { rule_index, regex });
        }
    }

    Ok(patterns)
}

/// Regex source for a matched word, against HTML-escaped text
fn word_pattern(word: &str) -> String {
    let escaped = html_escape::encode_text(word);
    let body = escaped
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let starts_word = word.chars().next().map(is_word_char).unwrap_or(false);
    let ends_word = word.chars().last().map(is_word_char).unwrap_or(false);

    format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        body,
        if ends_word { r"\b" } else { "" }
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Wrap matches inside one raw text node; `None` if nothing matched
fn mark_text(
    text: &str,
    patterns: &[WordPattern],
    rules: &[HighlightRule],
    config: &HighlightConfig,
    per_rule: &mut [usize],
) -> Option<String> {
    let entities = entity_spans(text);
    let mut claimed: Vec<(usize, usize, usize)> = Vec::new();

    for pattern in patterns {
        for m in pattern.regex.find_iter(text) {
            let (start, end) = (m.start(), m.end());
            if start == end || splits_entity(start, end, &entities) {
                continue;
            }
            if claimed.iter().any(|&(s, e, _)| start < e && s < end) {
                continue;
            }
            claimed.push((start, end, pattern.rule_index));
        }
    }

    if claimed.is_empty() {
        return None;
    }
    claimed.sort_by_key(|&(start, _, _)| start);

    let mut out = String::with_capacity(text.len() + claimed.len() * 64);
    let mut last = 0;
    for (start, end, rule_index) in claimed {
        out.push_str(&text[last..start]);
        out.push_str(&format!(
            "<span class=\"{}\" {}=\"{}\" style=\"background-color: {}\">",
            html_escape::encode_double_quoted_attribute(&config.class_name),
            config.rule_attribute,
            rule_index,
            html_escape::encode_double_quoted_attribute(&rules[rule_index].color),
        ));
        out.push_str(&text[start..end]);
        out.push_str("</span>");
        per_rule[rule_index] += 1;
        last = end;
    }
    out.push_str(&text[last..]);

    Some(out)
}

/// Byte ranges of character references such as `&amp;` or `&#39;`
fn entity_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'&' {
            let mut j = i + 1;
            while j < bytes.len() && j - i <= 32 && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'#') {
                j += 1;
            }
            if j < bytes.len() && j > i + 1 && bytes[j] == b';' {
                spans.push((i, j + 1));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    spans
}

fn splits_entity(start: usize, end: usize, entities: &[(usize, usize)]) -> bool {
    entities
        .iter()
        .any(|&(s, e)| (start > s && start < e) || (end > s && end < e))
}

/// Sanitize HTML to remove potentially dangerous elements
/// while preserving content structure for display
pub fn sanitize_html(html: &str) -> Result<String, InjectError> {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("style", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("*", |el| {
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|attr| attr.name())
                        .filter(|name| name.to_ascii_lowercase().starts_with("on"))
                        .collect();
                    for name in handlers {
                        el.remove_attribute(&name);
                    }
                    for attr in ["href", "src"] {
                        if let Some(value) = el.get_attribute(attr) {
                            if value.trim().to_lowercase().starts_with("javascript:") {
                                el.remove_attribute(attr);
                            }
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| InjectError::RewriteError(e.to_string()))?;

    Ok(result)
}
