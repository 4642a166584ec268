//! Turns free-text service responses into question strings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Leading list markers: `1.`, `2)`, `-`, `*`, `•`, `Q3:`.
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)]|[Qq]\d+[:.)])\s*").unwrap());

/// Parses question lists out of service responses.
///
/// Accepted shapes, tried in order: a fenced JSON block, a bare JSON array
/// (possibly surrounded by prose), then a numbered/bulleted list or one
/// question per line. JSON arrays may hold strings or objects with a
/// `question` or `text` field.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract question texts in response order. Blank entries are dropped.
    pub fn parse(&self, response: &str) -> Vec<String> {
        let response = response.trim();
        if response.is_empty() {
            return Vec::new();
        }

        if let Some(block) = fenced_block(response)
            && let Some(questions) = parse_json_array(block)
        {
            return questions;
        }

        if let Some(questions) = parse_json_array(response) {
            return questions;
        }

        if let (Some(start), Some(end)) = (response.find('['), response.rfind(']'))
            && start < end
            && let Some(questions) = parse_json_array(&response[start..=end])
        {
            return questions;
        }

        parse_lines(response)
    }
}

/// Contents of the first ``` fence, with an optional language tag removed.
fn fenced_block(text: &str) -> Option<&str> {
    let after = text.split("```").nth(1)?;
    let after = after.strip_prefix("json").unwrap_or(after);
    Some(after.trim())
}

fn parse_json_array(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    let questions = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(mut obj) => obj
                .remove("question")
                .or_else(|| obj.remove("text"))
                .and_then(|v| v.as_str().map(str::to_string)),
            _ => None,
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Some(questions)
}

fn parse_lines(text: &str) -> Vec<String> {
    let cleaned: Vec<String> = text
        .lines()
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .map(|line| line.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.ends_with(':'))
        .collect();

    // Prefer lines that are actual questions; prose wrappers rarely end in '?'.
    let questions: Vec<String> = cleaned.iter().filter(|l| l.ends_with('?')).cloned().collect();
    if questions.is_empty() {
        cleaned.into_iter().filter(|l| l.split_whitespace().count() >= 4).collect()
    } else {
        questions
    }
}
