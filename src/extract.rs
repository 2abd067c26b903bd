//! Heuristic extractors for the tool-call fallback path
//!
//! When the model answers without a structured tool call, these best-effort
//! pattern matchers pull a city or an arithmetic expression out of the raw
//! user text. All functions here are pure and total; `None` means "no match".

use crate::tools::{is_allowed_expression, title_case, WEATHER_TABLE};
use regex::Regex;
use std::sync::LazyLock;

/// Which tool the user text looks like it is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Weather,
    Math,
}

const WEATHER_KEYWORDS: &[&str] = &["weather", "temperature", "climate"];
const MATH_KEYWORDS: &[&str] = &["calculate", "math", "+", "-", "*", "/", "=", "result of"];

/// Keyword-set intent check; weather wins over math when both match
pub fn detect_intent(text: &str) -> Option<Intent> {
    let lower = text.to_lowercase();
    if WEATHER_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(Intent::Weather)
    } else if MATH_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(Intent::Math)
    } else {
        None
    }
}

static CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)weather (?:in |for )?([a-zA-Z\s]+)",
        r"(?i)(?:in |for )([a-zA-Z\s]+)(?:\s|$)",
        r"(?i)([a-zA-Z\s]+)(?:\s+weather|\s+temperature)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

static CITY_STOP_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(the|weather|temperature|climate|in|for|of)\b").expect("static regex")
});

/// Best-effort city extraction; first non-empty pattern match wins,
/// with a substring scan of the known-city table as the last resort
pub fn extract_city(text: &str) -> Option<String> {
    for pattern in CITY_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let raw = captures.get(1).map_or("", |m| m.as_str());
            let stripped = CITY_STOP_WORDS.replace_all(raw, "");
            let city = stripped.trim();
            if !city.is_empty() {
                return Some(title_case(city));
            }
        }
    }

    let lower = text.to_lowercase();
    WEATHER_TABLE
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(name, _)| title_case(name))
}

static EXPRESSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)calculate\s+([0-9+\-*/().\s]+)",
        r"(?i)what\s+is\s+([0-9+\-*/().\s]+)",
        r"([0-9+\-*/().\s]{3,})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

/// Best-effort arithmetic-expression extraction; the captured span must
/// fully match the calculator allow-list before it is returned
pub fn extract_expression(text: &str) -> Option<String> {
    for pattern in EXPRESSION_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let expression = captures.get(1).map_or("", |m| m.as_str()).trim();
            if is_allowed_expression(expression) {
                return Some(expression.to_string());
            }
        }
    }
    None
}
